// This module implements the presenter for Vec<u8>-backed owned strings such as
// java_string::owned::JavaString and alloc::string::String. A StringLayout names the exact
// type tag plus the field paths of the byte length and of the buffer pointer. Construction
// reads the length as a non-negative integer and classifies the buffer field once into a
// FieldShape: either it already is a pointer, or it is a single-field wrapper (a NonNull
// style newtype) whose only field is the pointer. Anything else is a layout the presenter
// does not understand and is reported as UnexpectedFieldShape. The resulting presenter hands
// the host a LazyText over exactly `length` bytes with the "string" display hint.

//! Presenter for `Vec<u8>`-backed owned strings.

use crate::core::{
    DisplayHint, DisplayText, HostInspector, LazyText, MemoryReader, PresentError, PresentResult,
    Presenter, PresenterFactory, ShapeMatcher, TagMatcher, TypeCode,
};

/// Tag of `java_string::owned::JavaString`.
pub const JAVA_STRING_TAG: &str = "java_string::owned::JavaString";

/// Tag of the standard library's `String`.
pub const STD_STRING_TAG: &str = "alloc::string::String";

const VEC_LEN_PATH: [&str; 2] = ["vec", "len"];
const VEC_BUFFER_PATH: [&str; 4] = ["vec", "buf", "ptr", "pointer"];

/// Where an owned string keeps its length and bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLayout {
    pub tag: String,
    pub length_path: Vec<String>,
    pub buffer_path: Vec<String>,
}

impl StringLayout {
    pub fn new<S: AsRef<str>>(tag: impl Into<String>, length_path: &[S], buffer_path: &[S]) -> Self {
        Self {
            tag: tag.into(),
            length_path: length_path.iter().map(|s| s.as_ref().to_string()).collect(),
            buffer_path: buffer_path.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    /// A string wrapping a `Vec<u8>` in a field named `vec`.
    pub fn vec_backed(tag: impl Into<String>) -> Self {
        Self::new(tag, &VEC_LEN_PATH, &VEC_BUFFER_PATH)
    }

    pub fn java_string() -> Self {
        Self::vec_backed(JAVA_STRING_TAG)
    }

    pub fn std_string() -> Self {
        Self::vec_backed(STD_STRING_TAG)
    }

    pub fn matcher(&self) -> TagMatcher {
        TagMatcher::struct_tag(self.tag.clone())
    }

    fn length_name(&self) -> String {
        self.length_path.join(".")
    }

    fn buffer_name(&self) -> String {
        self.buffer_path.join(".")
    }
}

/// Resolved form of the buffer field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    /// The field is the pointer.
    Address(u64),
    /// The field wraps the pointer in its only sub-field.
    Wrapped { field: String, address: u64 },
}

impl FieldShape {
    /// Classify the value found at `path`.
    pub fn classify<H: HostInspector>(host: &H, value: H::ValueRef, path: &str) -> PresentResult<Self> {
        let ty = host.value_type(value);
        match ty.code {
            TypeCode::Pointer => host
                .as_address(value)
                .map(FieldShape::Address)
                .ok_or_else(|| unexpected(path, "pointer has no readable address")),
            TypeCode::Struct => {
                let mut fields = host.fields(value);
                let (Some((name, inner)), None) = (fields.next(), fields.next()) else {
                    return Err(unexpected(path, format!("`{ty}` is not a single-field wrapper")));
                };

                let inner_path = format!("{path}.{name}");
                let inner_ty = host.value_type(inner);
                if inner_ty.code != TypeCode::Pointer {
                    return Err(unexpected(
                        &inner_path,
                        format!("expected a pointer, found `{inner_ty}`"),
                    ));
                }
                let address = host
                    .as_address(inner)
                    .ok_or_else(|| unexpected(&inner_path, "pointer has no readable address"))?;
                Ok(FieldShape::Wrapped {
                    field: name.to_string(),
                    address,
                })
            }
            TypeCode::Int => Err(unexpected(path, format!("expected a pointer, found `{ty}`"))),
        }
    }

    pub fn address(&self) -> u64 {
        match self {
            FieldShape::Address(address) | FieldShape::Wrapped { address, .. } => *address,
        }
    }
}

fn unexpected(path: &str, reason: impl Into<String>) -> PresentError {
    PresentError::UnexpectedFieldShape {
        path: path.to_string(),
        reason: reason.into(),
    }
}

/// Renders an owned string as UTF-8 text.
pub struct OwnedStringPresenter<'h> {
    memory: &'h dyn MemoryReader,
    length: usize,
    buffer: FieldShape,
}

impl<'h> OwnedStringPresenter<'h> {
    /// Extract length and buffer from `value`.
    ///
    /// Fails with `ShapeMismatch` if `value` is not of the layout's type.
    pub fn new<H: HostInspector>(host: &'h H, value: H::ValueRef, layout: &StringLayout) -> PresentResult<Self> {
        let ty = host.value_type(value);
        if !layout.matcher().matches(&ty) {
            return Err(PresentError::ShapeMismatch {
                expected: layout.tag.clone(),
                found: ty.to_string(),
            });
        }

        let length_name = layout.length_name();
        let length_field = host
            .field_path(value, &layout.length_path)
            .ok_or_else(|| PresentError::FieldMissing {
                path: length_name.clone(),
            })?;
        let length = match host.as_integer(length_field) {
            Some(n) => usize::try_from(n)
                .map_err(|_| unexpected(&length_name, format!("length {n} is out of range")))?,
            None => {
                let found = host.value_type(length_field);
                return Err(unexpected(&length_name, format!("expected an integer, found `{found}`")));
            }
        };

        let buffer_name = layout.buffer_name();
        let buffer_field = host
            .field_path(value, &layout.buffer_path)
            .ok_or_else(|| PresentError::FieldMissing {
                path: buffer_name.clone(),
            })?;
        let buffer = FieldShape::classify(host, buffer_field, &buffer_name)?;

        log::trace!(
            "{}: {} bytes at {:#x} ({:?})",
            layout.tag,
            length,
            buffer.address(),
            buffer
        );
        Ok(Self {
            memory: host,
            length,
            buffer,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn buffer(&self) -> &FieldShape {
        &self.buffer
    }
}

impl<'h> Presenter<'h> for OwnedStringPresenter<'h> {
    fn name(&self) -> &str {
        "owned string"
    }

    fn to_text(&self) -> DisplayText<'h> {
        DisplayText::Lazy(LazyText::new(self.memory, self.buffer.address(), self.length))
    }

    fn display_hint(&self) -> Option<DisplayHint> {
        Some(DisplayHint::String)
    }
}

/// Registry factory for [`OwnedStringPresenter`].
#[derive(Debug, Clone)]
pub struct StringPresenterFactory {
    layout: StringLayout,
}

impl StringPresenterFactory {
    pub fn new(layout: StringLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &StringLayout {
        &self.layout
    }
}

impl<H: HostInspector> PresenterFactory<H> for StringPresenterFactory {
    fn build<'h>(&self, host: &'h H, value: H::ValueRef) -> PresentResult<Box<dyn Presenter<'h> + 'h>> {
        Ok(Box::new(OwnedStringPresenter::new(host, value, &self.layout)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DecodeMode;
    use crate::snapshot::Snapshot;
    use bumpalo::Bump;

    fn decode(presenter: &OwnedStringPresenter<'_>) -> String {
        match presenter.to_text() {
            DisplayText::Lazy(text) => text.decode(DecodeMode::Strict, None).unwrap().text,
            DisplayText::Text(text) => text,
        }
    }

    #[test]
    fn test_direct_pointer() {
        let arena = Bump::new();
        let snap = Snapshot::parse(
            &arena,
            r#"
memory 0x1000 = "hello"
value s = struct java_string::owned::JavaString {
    vec: struct Vec { len: int 5  buf: struct RawVec { ptr: struct Unique { pointer: ptr 0x1000 } } }
}
"#,
        )
        .unwrap();

        let s = snap.root("s").unwrap();
        let presenter = OwnedStringPresenter::new(&snap, s, &StringLayout::java_string()).unwrap();
        assert_eq!(presenter.length(), 5);
        assert_eq!(presenter.buffer(), &FieldShape::Address(0x1000));
        assert_eq!(presenter.display_hint(), Some(DisplayHint::String));
        assert_eq!(decode(&presenter), "hello");
    }

    #[test]
    fn test_wrapped_pointer() {
        let arena = Bump::new();
        let snap = Snapshot::parse(
            &arena,
            r#"
memory 0x1000 = "hello"
value s = struct java_string::owned::JavaString {
    vec: struct Vec {
        len: int 5
        buf: struct RawVec { ptr: struct Unique { pointer: struct NonNull { pointer: ptr 0x1000 } } }
    }
}
"#,
        )
        .unwrap();

        let s = snap.root("s").unwrap();
        let presenter = OwnedStringPresenter::new(&snap, s, &StringLayout::java_string()).unwrap();
        assert_eq!(
            presenter.buffer(),
            &FieldShape::Wrapped {
                field: "pointer".to_string(),
                address: 0x1000
            }
        );
        assert_eq!(decode(&presenter), "hello");
    }

    #[test]
    fn test_wrong_tag_is_shape_mismatch() {
        let arena = Bump::new();
        let snap = Snapshot::parse(&arena, "value s = struct SomeOtherType { len: int 1 }").unwrap();

        let err = OwnedStringPresenter::new(&snap, snap.root("s").unwrap(), &StringLayout::java_string())
            .err()
            .unwrap();
        assert_eq!(
            err,
            PresentError::ShapeMismatch {
                expected: JAVA_STRING_TAG.to_string(),
                found: "struct SomeOtherType".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_buffer_is_field_missing() {
        let arena = Bump::new();
        let snap = Snapshot::parse(
            &arena,
            "value s = struct java_string::owned::JavaString { vec: struct Vec { len: int 3 } }",
        )
        .unwrap();

        let err = OwnedStringPresenter::new(&snap, snap.root("s").unwrap(), &StringLayout::java_string())
            .err()
            .unwrap();
        assert_eq!(
            err,
            PresentError::FieldMissing {
                path: "vec.buf.ptr.pointer".to_string()
            }
        );
    }

    #[test]
    fn test_two_field_wrapper_is_rejected() {
        let arena = Bump::new();
        let snap = Snapshot::parse(
            &arena,
            r#"
value s = struct java_string::owned::JavaString {
    vec: struct Vec {
        len: int 0
        buf: struct RawVec { ptr: struct Unique { pointer: struct Fat { a: ptr 0x10  b: int 2 } } }
    }
}
"#,
        )
        .unwrap();

        let err = OwnedStringPresenter::new(&snap, snap.root("s").unwrap(), &StringLayout::java_string())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            PresentError::UnexpectedFieldShape { ref path, .. } if path == "vec.buf.ptr.pointer"
        ));
    }

    #[test]
    fn test_wrapper_around_integer_is_rejected() {
        let arena = Bump::new();
        let snap = Snapshot::parse(
            &arena,
            r#"
value s = struct java_string::owned::JavaString {
    vec: struct Vec {
        len: int 0
        buf: struct RawVec { ptr: struct Unique { pointer: struct NonNull { pointer: int 4096 } } }
    }
}
"#,
        )
        .unwrap();

        let err = OwnedStringPresenter::new(&snap, snap.root("s").unwrap(), &StringLayout::java_string())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            PresentError::UnexpectedFieldShape { ref path, .. } if path == "vec.buf.ptr.pointer.pointer"
        ));
    }

    #[test]
    fn test_negative_length_is_rejected() {
        let arena = Bump::new();
        let snap = Snapshot::parse(
            &arena,
            r#"
value s = struct java_string::owned::JavaString {
    vec: struct Vec { len: int -1  buf: struct RawVec { ptr: struct Unique { pointer: ptr 0x10 } } }
}
"#,
        )
        .unwrap();

        let err = OwnedStringPresenter::new(&snap, snap.root("s").unwrap(), &StringLayout::java_string())
            .err()
            .unwrap();
        assert!(matches!(err, PresentError::UnexpectedFieldShape { ref path, .. } if path == "vec.len"));
    }

    #[test]
    fn test_custom_layout() {
        let arena = Bump::new();
        let snap = Snapshot::parse(
            &arena,
            r#"
memory 0x40 = "abc"
value s = struct my::Str { size: int 3  data: ptr 0x40 }
"#,
        )
        .unwrap();

        let layout = StringLayout::new("my::Str", &["size"], &["data"]);
        let presenter = OwnedStringPresenter::new(&snap, snap.root("s").unwrap(), &layout).unwrap();
        assert_eq!(decode(&presenter), "abc");
    }
}
