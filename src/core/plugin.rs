// This module implements the registration driver that attaches a presenter registry to a
// host at plugin load. Hosts expose two registration scopes: the module currently being
// loaded (only present when the plugin is loaded alongside a module) and the whole running
// program (always expected to exist). attach tries the narrower scope first and falls back
// to the program scope as an explicit two-step Result sequence. When both fail the loader
// gets a RegistrationError that carries both causes, so an operator can see why the module
// scope was skipped as well as why the program scope refused.

//! Two-tier registration of presenter registries.

use std::fmt;
use std::sync::Arc;

use super::error::{HostError, RegistrationError};
use super::host::HostInspector;
use super::registry::PresenterRegistry;

/// Registration API offered by a host's plugin loader.
pub trait PluginHost<H: HostInspector> {
    /// Attach to the module currently being loaded.
    fn attach_to_current_module(&mut self, registry: Arc<PresenterRegistry<H>>) -> Result<(), HostError>;

    /// Attach to the whole running program.
    fn attach_to_program(&mut self, registry: Arc<PresenterRegistry<H>>) -> Result<(), HostError>;
}

/// Scope that accepted a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachedScope {
    CurrentModule,
    Program,
}

impl fmt::Display for AttachedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachedScope::CurrentModule => f.write_str("current module"),
            AttachedScope::Program => f.write_str("program"),
        }
    }
}

/// Attach `registry` to the current module, or to the program if that fails.
pub fn attach<H, P>(host: &mut P, registry: &Arc<PresenterRegistry<H>>) -> Result<AttachedScope, RegistrationError>
where
    H: HostInspector,
    P: PluginHost<H> + ?Sized,
{
    let module = match host.attach_to_current_module(Arc::clone(registry)) {
        Ok(()) => {
            log::debug!("registry `{}` attached to the current module", registry.name());
            return Ok(AttachedScope::CurrentModule);
        }
        Err(err) => err,
    };
    log::debug!(
        "registry `{}`: current module scope failed ({module}), trying program",
        registry.name()
    );

    match host.attach_to_program(Arc::clone(registry)) {
        Ok(()) => {
            log::debug!("registry `{}` attached to the program", registry.name());
            Ok(AttachedScope::Program)
        }
        Err(program) => Err(RegistrationError { module, program }),
    }
}
