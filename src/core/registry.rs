// This module provides PresenterRegistry, the ordered table of (shape matcher, presenter
// factory) pairs a host consults once per displayed value. Registration takes &mut self and
// happens once at plugin load; afterwards the registry is shared behind an Arc and only read,
// so find/present take &self and are safe for concurrent readers. Lookup walks the entries
// in registration order and stops at the first matcher that accepts the value's type: an
// unmatched value is Ok(None), never an error. If the first matching factory fails (a field
// is missing or mis-shaped) the error is returned as is and later entries are not consulted,
// which lets the host fall back to its default rendering for that one value.

//! Ordered presenter lookup.

use std::fmt;

use super::error::PresentResult;
use super::host::HostInspector;
use super::presenter::{DisplayResult, Presenter, PresenterFactory};
use super::shape::ShapeMatcher;

struct Entry<H: HostInspector> {
    matcher: Box<dyn ShapeMatcher>,
    factory: Box<dyn PresenterFactory<H>>,
}

/// Ordered table of presenters for one host type.
pub struct PresenterRegistry<H: HostInspector> {
    name: String,
    entries: Vec<Entry<H>>,
}

impl<H: HostInspector> PresenterRegistry<H> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a presenter. Earlier registrations win on overlapping matchers.
    pub fn register<M, F>(&mut self, matcher: M, factory: F)
    where
        M: ShapeMatcher + 'static,
        F: PresenterFactory<H> + 'static,
    {
        log::debug!(
            "registry `{}`: registered presenter #{} for {}",
            self.name,
            self.entries.len(),
            matcher.describe()
        );
        self.entries.push(Entry {
            matcher: Box::new(matcher),
            factory: Box::new(factory),
        });
    }

    /// Build the presenter for `value`, if any applies.
    pub fn find<'h>(
        &self,
        host: &'h H,
        value: H::ValueRef,
    ) -> PresentResult<Option<Box<dyn Presenter<'h> + 'h>>> {
        let ty = host.value_type(value);
        let Some((index, entry)) = self
            .entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.matcher.matches(&ty))
        else {
            log::trace!("registry `{}`: no presenter for {}", self.name, ty);
            return Ok(None);
        };

        log::trace!(
            "registry `{}`: presenter #{} ({}) matched {}",
            self.name,
            index,
            entry.matcher.describe(),
            ty
        );
        entry.factory.build(host, value).map(Some)
    }

    /// Find a presenter and ask it for its text and hint.
    pub fn present<'h>(
        &self,
        host: &'h H,
        value: H::ValueRef,
    ) -> PresentResult<Option<DisplayResult<'h>>> {
        let Some(presenter) = self.find(host, value)? else {
            return Ok(None);
        };
        Ok(Some(DisplayResult {
            text: presenter.to_text(),
            hint: presenter.display_hint(),
        }))
    }
}

impl<H: HostInspector> fmt::Debug for PresenterRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresenterRegistry")
            .field("name", &self.name)
            .field(
                "matchers",
                &self
                    .entries
                    .iter()
                    .map(|entry| entry.matcher.describe())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
