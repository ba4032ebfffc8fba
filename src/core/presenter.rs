// This module defines the presenter side of the registry contract. A Presenter is built
// from one matched value, extracts everything it needs at construction time, and is then
// asked once for its text and its display hint. PresenterFactory is the trait seam the
// registry stores next to each shape matcher: it turns a host value handle into a boxed
// presenter that may borrow the host for the duration of one inspection call. DisplayHint
// is the small protocol telling the host how to frame the text (quotes for strings, nothing
// for aggregates), and DisplayText lets a presenter return either an undecoded LazyText or
// an already owned string.

//! Presenter and factory traits plus the display hint protocol.

use std::fmt;

use super::error::PresentResult;
use super::host::HostInspector;
use super::text::LazyText;

/// How the host should frame a presenter's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayHint {
    String,
    Array,
    Map,
}

impl DisplayHint {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayHint::String => "string",
            DisplayHint::Array => "array",
            DisplayHint::Map => "map",
        }
    }

    /// Wrap rendered text in the chrome this hint asks for.
    pub fn frame(self, text: &str) -> String {
        match self {
            DisplayHint::String => format!("{text:?}"),
            DisplayHint::Array | DisplayHint::Map => text.to_string(),
        }
    }
}

impl fmt::Display for DisplayHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text produced by a presenter.
#[derive(Debug)]
pub enum DisplayText<'a> {
    /// Not yet read from the host.
    Lazy(LazyText<'a>),
    Text(String),
}

/// Text plus the hint that goes with it.
#[derive(Debug)]
pub struct DisplayResult<'a> {
    pub text: DisplayText<'a>,
    pub hint: Option<DisplayHint>,
}

/// Renders one value, borrowing the host for `'h`.
pub trait Presenter<'h> {
    /// Name used in log messages.
    fn name(&self) -> &str;

    fn to_text(&self) -> DisplayText<'h>;

    /// `None` renders as an opaque aggregate.
    fn display_hint(&self) -> Option<DisplayHint> {
        None
    }
}

/// Builds presenters for values that passed the paired shape matcher.
pub trait PresenterFactory<H: HostInspector>: Send + Sync {
    fn build<'h>(&self, host: &'h H, value: H::ValueRef) -> PresentResult<Box<dyn Presenter<'h> + 'h>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_strings() {
        assert_eq!(DisplayHint::String.as_str(), "string");
        assert_eq!(DisplayHint::Array.to_string(), "array");
        assert_eq!(DisplayHint::Map.as_str(), "map");
    }

    #[test]
    fn test_string_frame_quotes_and_escapes() {
        assert_eq!(DisplayHint::String.frame("hello"), "\"hello\"");
        assert_eq!(DisplayHint::String.frame("a\"b\n"), "\"a\\\"b\\n\"");
        assert_eq!(DisplayHint::Array.frame("[1, 2]"), "[1, 2]");
    }
}
