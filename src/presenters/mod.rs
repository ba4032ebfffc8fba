//! Built-in presenters and the plugin entry point.
//!
//! [`load`] is what a host's plugin loader calls once: it builds the
//! built-in registry and attaches it through the two-tier driver.

pub mod owned_string;

use std::sync::Arc;

use crate::core::{attach, HostInspector, PluginHost, PresenterRegistry, RegistrationError};

pub use owned_string::{
    FieldShape, OwnedStringPresenter, StringLayout, StringPresenterFactory, JAVA_STRING_TAG,
    STD_STRING_TAG,
};

/// Name of the registry built by [`builtin_registry`].
pub const BUILTIN_REGISTRY_NAME: &str = "value-presenter";

/// Registry with every built-in presenter, in lookup order.
pub fn builtin_registry<H: HostInspector>() -> PresenterRegistry<H> {
    let mut registry = PresenterRegistry::new(BUILTIN_REGISTRY_NAME);
    register_string_layout(&mut registry, StringLayout::java_string());
    register_string_layout(&mut registry, StringLayout::std_string());
    registry
}

pub fn register_string_layout<H: HostInspector>(registry: &mut PresenterRegistry<H>, layout: StringLayout) {
    registry.register(layout.matcher(), StringPresenterFactory::new(layout));
}

/// Plugin entry point: build the built-in registry and attach it to `host`.
pub fn load<H, P>(host: &mut P) -> Result<Arc<PresenterRegistry<H>>, RegistrationError>
where
    H: HostInspector,
    P: PluginHost<H> + ?Sized,
{
    let registry = Arc::new(builtin_registry());
    let scope = attach(host, &registry)?;
    log::info!(
        "loaded {} presenters into the {scope} scope",
        registry.len()
    );
    Ok(registry)
}
