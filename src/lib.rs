//! value-presenter - readable views of raw in-memory values.
//!
//! A debugger or introspection host hands this crate opaque value handles;
//! a registry of presenters turns the ones it recognises (owned strings for
//! now) into text plus a display hint, and everything else falls back to a
//! default aggregate rendering.
//!
//! # Primary Usage
//!
//! ```ignore
//! use bumpalo::Bump;
//! use value_presenter::core::{render, PresentOptions};
//! use value_presenter::presenters;
//! use value_presenter::snapshot::{Snapshot, SnapshotLoader};
//!
//! let arena = Bump::new();
//! let snapshot = Snapshot::parse(&arena, &text)?;
//! let mut loader = SnapshotLoader::new(&snapshot);
//! presenters::load(&mut loader)?;
//!
//! for (name, value) in snapshot.roots() {
//!     let rendered = render(loader.registries(), &snapshot, value, &PresentOptions::default());
//!     println!("{name} = {}", rendered.text);
//! }
//! ```
//!
//! # Architecture
//!
//! - [`core`] - Host seam, lazy text, registry, registration driver, rendering
//! - [`presenters`] - Built-in presenters and the plugin entry point
//! - [`snapshot`] - Text-described process state implementing the host seam

pub mod core;
pub mod presenters;
pub mod snapshot;

pub use self::core::{
    // Host seam
    HostInspector, MemoryReader, TypeCode, TypeDescriptor,
    // Presenters
    DisplayHint, DisplayResult, DisplayText, Presenter, PresenterFactory, PresenterRegistry,
    ShapeMatcher, TagMatcher,
    // Text
    DecodeMode, LazyText,
    // Host integration
    attach, render, AttachedScope, PluginHost, PresentOptions, Rendered, RenderSource,
    // Errors
    HostError, PresentError, PresentResult, RegistrationError,
};
pub use presenters::{builtin_registry, load, OwnedStringPresenter, StringLayout};
pub use snapshot::{Snapshot, SnapshotError, SnapshotLoader};
