//! Plugin loader scopes for a [`Snapshot`].
//!
//! The current-module scope exists only when the snapshot declares a
//! `module`; the program scope always exists. Lookup consults module
//! registries before program registries.

use std::sync::Arc;

use super::Snapshot;
use crate::core::{HostError, PluginHost, PresenterRegistry};

type SnapshotRegistry<'a> = PresenterRegistry<Snapshot<'a>>;

/// Registration scopes backed by a snapshot.
#[derive(Debug, Default)]
pub struct SnapshotLoader<'a> {
    module: Option<&'a str>,
    module_registries: Vec<Arc<SnapshotRegistry<'a>>>,
    program_registries: Vec<Arc<SnapshotRegistry<'a>>>,
}

impl<'a> SnapshotLoader<'a> {
    pub fn new(snapshot: &Snapshot<'a>) -> Self {
        Self {
            module: snapshot.module(),
            module_registries: Vec::new(),
            program_registries: Vec::new(),
        }
    }

    /// Attached registries in lookup order.
    pub fn registries(&self) -> impl Iterator<Item = &SnapshotRegistry<'a>> + '_ {
        self.module_registries
            .iter()
            .chain(&self.program_registries)
            .map(|registry| registry.as_ref())
    }

    pub fn module_registry_count(&self) -> usize {
        self.module_registries.len()
    }

    pub fn program_registry_count(&self) -> usize {
        self.program_registries.len()
    }
}

fn push_unique<'a>(
    scope: &mut Vec<Arc<SnapshotRegistry<'a>>>,
    registry: Arc<SnapshotRegistry<'a>>,
) -> Result<(), HostError> {
    if scope.iter().any(|attached| attached.name() == registry.name()) {
        return Err(HostError::Rejected {
            reason: format!("registry `{}` is already attached", registry.name()),
        });
    }
    scope.push(registry);
    Ok(())
}

impl<'a> PluginHost<Snapshot<'a>> for SnapshotLoader<'a> {
    fn attach_to_current_module(&mut self, registry: Arc<SnapshotRegistry<'a>>) -> Result<(), HostError> {
        let Some(module) = self.module else {
            return Err(HostError::ScopeUnavailable {
                scope: "current module",
            });
        };
        log::trace!("attaching `{}` to module `{module}`", registry.name());
        push_unique(&mut self.module_registries, registry)
    }

    fn attach_to_program(&mut self, registry: Arc<SnapshotRegistry<'a>>) -> Result<(), HostError> {
        push_unique(&mut self.program_registries, registry)
    }
}
