// This module is the host-facing front of the registry: given a value it produces the final
// display string. It looks the value up, decodes lazy text according to PresentOptions
// (decode mode and the "print elements" style character limit), frames the text according
// to the presenter's display hint, and falls back to the default aggregate rendering when no
// presenter applies. Extraction errors and memory read failures are local to one value: they
// are logged as warnings and the value is rendered raw, they never propagate to the caller.
// The aggregate rendering walks struct fields in declaration order, printing integers in
// decimal and pointers in hex, bounded by a nesting depth.

//! Rendering with hint framing and default fallback.

use std::fmt::Write as _;

use super::error::HostError;
use super::host::{HostInspector, TypeCode};
use super::presenter::{DisplayResult, DisplayText};
use super::registry::PresenterRegistry;
use super::text::DecodeMode;

/// Default character limit, matching the usual debugger "print elements".
pub const DEFAULT_MAX_CHARS: usize = 200;

/// Deepest struct nesting printed by the aggregate fallback.
const MAX_AGGREGATE_DEPTH: usize = 8;

/// Host-side rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentOptions {
    pub mode: DecodeMode,
    /// `None` decodes the whole text.
    pub max_chars: Option<usize>,
}

impl Default for PresentOptions {
    fn default() -> Self {
        Self {
            mode: DecodeMode::Lenient,
            max_chars: Some(DEFAULT_MAX_CHARS),
        }
    }
}

/// Where a rendering came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSource {
    Presenter,
    Fallback,
}

/// Final display string for one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub source: RenderSource,
}

/// Render `value` through the first registry that has a presenter for it.
///
/// Registries are consulted in order; values no registry handles, or whose
/// presenter fails, get the aggregate rendering.
pub fn render<'r, H, I>(registries: I, host: &H, value: H::ValueRef, options: &PresentOptions) -> Rendered
where
    H: HostInspector,
    I: IntoIterator<Item = &'r PresenterRegistry<H>>,
    H: 'r,
{
    for registry in registries {
        match registry.present(host, value) {
            Ok(Some(result)) => match finish(result, options) {
                Ok(text) => {
                    return Rendered {
                        text,
                        source: RenderSource::Presenter,
                    }
                }
                Err(err) => {
                    log::warn!("cannot read text of {value:?}: {err}; rendering raw");
                    break;
                }
            },
            Ok(None) => continue,
            Err(err) => {
                log::warn!(
                    "presenter from `{}` failed on {value:?}: {err}; rendering raw",
                    registry.name()
                );
                break;
            }
        }
    }

    Rendered {
        text: render_aggregate(host, value),
        source: RenderSource::Fallback,
    }
}

/// Decode and frame presenter output. The truncation marker goes after the
/// framing, so `"abc"...` is a cut-off string and `"abc..."` is not.
fn finish(result: DisplayResult<'_>, options: &PresentOptions) -> Result<String, HostError> {
    let (text, truncated) = match result.text {
        DisplayText::Text(text) => (text, false),
        DisplayText::Lazy(lazy) => {
            let decoded = lazy.decode(options.mode, options.max_chars)?;
            if let Some(offset) = decoded.invalid_at {
                log::debug!("text is not valid UTF-8 past byte {offset}");
            }
            (decoded.text, decoded.truncated)
        }
    };

    let mut text = match result.hint {
        Some(hint) => hint.frame(&text),
        None => text,
    };
    if truncated {
        text.push_str("...");
    }
    Ok(text)
}

/// Default raw rendering: `Tag { field: value, .. }`.
pub fn render_aggregate<H: HostInspector>(host: &H, value: H::ValueRef) -> String {
    let mut out = String::new();
    write_aggregate(host, value, 0, &mut out);
    out
}

fn write_aggregate<H: HostInspector>(host: &H, value: H::ValueRef, depth: usize, out: &mut String) {
    let ty = host.value_type(value);
    match ty.code {
        TypeCode::Int => match host.as_integer(value) {
            Some(n) => {
                let _ = write!(out, "{n}");
            }
            None => out.push_str("<int?>"),
        },
        TypeCode::Pointer => match host.as_address(value) {
            Some(address) => {
                let _ = write!(out, "{address:#x}");
            }
            None => out.push_str("<ptr?>"),
        },
        TypeCode::Struct => {
            out.push_str(ty.tag.unwrap_or("<anonymous>"));
            if depth >= MAX_AGGREGATE_DEPTH {
                out.push_str(" {...}");
                return;
            }

            let mut fields = host.fields(value).peekable();
            if fields.peek().is_none() {
                return;
            }
            out.push_str(" { ");
            let mut first = true;
            for (name, field) in fields {
                if !first {
                    out.push_str(", ");
                }
                first = false;
                out.push_str(name);
                out.push_str(": ");
                write_aggregate(host, field, depth + 1, out);
            }
            out.push_str(" }");
        }
    }
}
