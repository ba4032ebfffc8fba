//! Shape matchers: pure predicates over a value's type descriptor.

use std::fmt;

use super::host::{TypeCode, TypeDescriptor};

/// Decides whether a presenter applies to a type.
///
/// Matchers must be pure; the registry may call them from several threads.
pub trait ShapeMatcher: Send + Sync {
    fn matches(&self, ty: &TypeDescriptor<'_>) -> bool;

    /// Short description used in log messages.
    fn describe(&self) -> String {
        String::from("<custom matcher>")
    }
}

impl<F> ShapeMatcher for F
where
    F: Fn(&TypeDescriptor<'_>) -> bool + Send + Sync,
{
    fn matches(&self, ty: &TypeDescriptor<'_>) -> bool {
        self(ty)
    }
}

/// Matches a type code and an exact tag.
///
/// The comparison is plain string equality: `Vec<u8>` does not match
/// `alloc::vec::Vec<u8>` and `Foo` does not match `Foo2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatcher {
    code: TypeCode,
    tag: String,
}

impl TagMatcher {
    pub fn new(code: TypeCode, tag: impl Into<String>) -> Self {
        Self {
            code,
            tag: tag.into(),
        }
    }

    /// Shorthand for a struct with the given tag.
    pub fn struct_tag(tag: impl Into<String>) -> Self {
        Self::new(TypeCode::Struct, tag)
    }

    pub fn code(&self) -> TypeCode {
        self.code
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl ShapeMatcher for TagMatcher {
    fn matches(&self, ty: &TypeDescriptor<'_>) -> bool {
        ty.code == self.code && ty.tag == Some(self.tag.as_str())
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TagMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: &str = "java_string::owned::JavaString";

    #[test]
    fn test_exact_tag_matches() {
        let matcher = TagMatcher::struct_tag(TAG);
        assert!(matcher.matches(&TypeDescriptor::new(TypeCode::Struct, Some(TAG))));
    }

    #[test]
    fn test_prefix_and_substring_do_not_match() {
        let matcher = TagMatcher::struct_tag(TAG);
        for tag in [
            "java_string::owned::JavaStringBuf",
            "owned::JavaString",
            "java_string::owned::JavaStr",
            "java_string::owned::JavaString ",
            "",
        ] {
            assert!(
                !matcher.matches(&TypeDescriptor::new(TypeCode::Struct, Some(tag))),
                "{tag}"
            );
        }
    }

    #[test]
    fn test_code_must_match() {
        let matcher = TagMatcher::struct_tag(TAG);
        assert!(!matcher.matches(&TypeDescriptor::new(TypeCode::Pointer, Some(TAG))));
        assert!(!matcher.matches(&TypeDescriptor::new(TypeCode::Struct, None)));
    }

    #[test]
    fn test_closure_matcher() {
        let matcher = |ty: &TypeDescriptor<'_>| ty.code == TypeCode::Int;
        assert!(matcher.matches(&TypeDescriptor::new(TypeCode::Int, None)));
        assert!(!ShapeMatcher::matches(
            &matcher,
            &TypeDescriptor::new(TypeCode::Struct, None)
        ));
        assert_eq!(matcher.describe(), "<custom matcher>");
    }

    #[test]
    fn test_describe() {
        assert_eq!(TagMatcher::struct_tag("Foo").describe(), "struct Foo");
    }
}
