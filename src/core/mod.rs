// This module is the hub of the presenter framework. It gathers the host inspection seam
// (HostInspector, MemoryReader, TypeDescriptor), lazily decoded text (LazyText and its
// decode modes), shape matchers, the Presenter/PresenterFactory traits with the display
// hint protocol, the ordered PresenterRegistry, the two-tier registration driver, and the
// rendering front that applies hints and falls back to the default aggregate rendering.
// Nothing here knows about a concrete library layout; concrete presenters live in
// crate::presenters and a concrete host lives in crate::snapshot.

//! Core presenter infrastructure.
//!
//! # Key Components
//!
//! ## Host seam (`host`)
//! - `HostInspector` trait with an associated value handle type
//! - Type descriptors with a structural code and an optional tag
//!
//! ## Lazy text (`text`)
//! - Address plus length views decoded in chunks on demand
//! - Strict and lenient UTF-8 handling
//!
//! ## Lookup (`shape`, `presenter`, `registry`)
//! - Exact-tag matchers
//! - First-match-wins registry, no match is not an error
//!
//! ## Host integration (`plugin`, `render`)
//! - Current-module then program registration
//! - Hint framing and default aggregate fallback

pub mod error;
pub mod host;
pub mod text;
pub mod shape;
pub mod presenter;
pub mod registry;
pub mod plugin;
pub mod render;

pub use error::{
    HostError,
    PresentError,
    PresentResult,
    RegistrationError,
};

pub use host::{
    HostInspector,
    MemoryReader,
    TypeCode,
    TypeDescriptor,
};

pub use text::{
    DecodeMode,
    DecodedText,
    LazyText,
    TextChars,
};

pub use shape::{ShapeMatcher, TagMatcher};

pub use presenter::{
    DisplayHint,
    DisplayResult,
    DisplayText,
    Presenter,
    PresenterFactory,
};

pub use registry::PresenterRegistry;
pub use plugin::{attach, AttachedScope, PluginHost};
pub use render::{
    render,
    render_aggregate,
    PresentOptions,
    RenderSource,
    Rendered,
    DEFAULT_MAX_CHARS,
};
