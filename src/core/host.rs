// This module defines the HostInspector trait, the bridge between presenters and whatever
// debugger or introspection host owns the inspected process. The trait exposes the minimal
// set of queries a presenter needs: the type descriptor of a value (a structural TypeCode
// plus an optional tag such as `java_string::owned::JavaString`), named sub-field access,
// declaration-ordered field iteration for default rendering, and integer/address readings
// of scalar values. Memory access lives in the separate MemoryReader supertrait so that
// lazily decoded text can hold a plain trait object instead of being generic over the host.
// Value handles are an associated Copy type: the host owns the inspected values and
// presenters only ever hold handles for the duration of one inspection call.

//! Host inspection responsibilities.
//!
//! The host is whatever owns the paused process state: a debugger, a core
//! dump reader, or the [`Snapshot`](crate::snapshot::Snapshot) used in tests.
//! Presenters assume:
//! - Every value has a [`TypeDescriptor`] with a structural [`TypeCode`].
//! - Struct values expose named fields in declaration order.
//! - Pointer values can be read as an address; integer values as an integer.
//! - Memory is readable by address and length, and reads either fill the
//!   whole buffer or fail.

use std::fmt;

use super::error::HostError;
use super::text::LazyText;

/// Structural kind of a value, independent of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Struct,
    Pointer,
    Int,
}

impl TypeCode {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeCode::Struct => "struct",
            TypeCode::Pointer => "ptr",
            TypeCode::Int => "int",
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of a value as the host describes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor<'a> {
    pub code: TypeCode,
    /// Fully qualified type name, if the host knows one.
    pub tag: Option<&'a str>,
}

impl<'a> TypeDescriptor<'a> {
    pub fn new(code: TypeCode, tag: Option<&'a str>) -> Self {
        Self { code, tag }
    }
}

impl fmt::Display for TypeDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "{} {}", self.code, tag),
            None => write!(f, "{}", self.code),
        }
    }
}

/// Raw memory access into the inspected process.
pub trait MemoryReader {
    /// Fill `buf` with the bytes starting at `address`.
    ///
    /// Reading an empty buffer always succeeds.
    fn read_memory(&self, address: u64, buf: &mut [u8]) -> Result<(), HostError>;
}

/// Bridge between a host and the presenters.
///
/// Handles are cheap to copy and only valid while the host keeps the
/// inspected state alive.
pub trait HostInspector: MemoryReader {
    type ValueRef: Copy + Eq + fmt::Debug;

    /// Type descriptor of a value.
    fn value_type(&self, value: Self::ValueRef) -> TypeDescriptor<'_>;

    /// Named sub-field of a struct value.
    fn field(&self, value: Self::ValueRef, name: &str) -> Option<Self::ValueRef>;

    /// Sub-fields of a struct value in declaration order.
    fn fields(&self, value: Self::ValueRef) -> Box<dyn Iterator<Item = (&str, Self::ValueRef)> + '_>;

    /// Integer reading of an `Int` value.
    fn as_integer(&self, value: Self::ValueRef) -> Option<i128>;

    /// Address held by a `Pointer` value.
    fn as_address(&self, value: Self::ValueRef) -> Option<u64>;

    /// Follow a dotted chain of field names, e.g. `["vec", "len"]`.
    fn field_path<S: AsRef<str>>(&self, value: Self::ValueRef, path: &[S]) -> Option<Self::ValueRef>
    where
        Self: Sized,
    {
        path.iter()
            .try_fold(value, |current, name| self.field(current, name.as_ref()))
    }

    /// Lazy text view over `length` bytes at `address`.
    fn lazy_string(&self, address: u64, length: usize) -> LazyText<'_>
    where
        Self: Sized,
    {
        LazyText::new(self, address, length)
    }
}
