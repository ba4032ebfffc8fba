//! Text-described process snapshots.
//!
//! A [`Snapshot`] is a small stand-in for a paused process: named memory
//! segments plus typed value trees. It implements [`HostInspector`] so the
//! presenters can be exercised without a real debugger, and it backs the
//! `vpresent` binary.
//!
//! # Snapshot Format
//!
//! ```text
//! ; Comments start with semicolon
//! module "app"
//! memory 0x1000 = "hello"
//! memory 0x2000 = [68 65 ff]
//! value s = struct java_string::owned::JavaString {
//!     vec: struct alloc::vec::Vec<u8> {
//!         len: int 5
//!         buf: struct RawVec { ptr: struct Unique { pointer: ptr 0x1000 } }
//!     }
//! }
//! ```
//!
//! Tags and field names are interned in a caller-owned `bumpalo` arena, so
//! a snapshot borrows from that arena and never from the source text.

use bumpalo::Bump;
use hashbrown::HashMap;
use thiserror::Error;

use crate::core::{HostError, HostInspector, MemoryReader, TypeCode, TypeDescriptor};

pub mod loader;
pub mod parser;

pub use loader::SnapshotLoader;

/// Errors produced while loading a snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("line {line}: {message}")]
    Parse {
        line: usize,
        message: String,
    },

    #[error("value `{name}` is defined twice")]
    DuplicateValue {
        name: String,
    },

    #[error("memory segment at {address:#x} overlaps another segment")]
    OverlappingMemory {
        address: u64,
    },
}

/// Handle to a value inside a [`Snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(u32);

impl ValueId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Node<'a> {
    Int(i128),
    Ptr(u64),
    Struct {
        tag: &'a str,
        fields: &'a [(&'a str, ValueId)],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub address: u64,
    pub bytes: &'a [u8],
}

/// Parsed snapshot.
#[derive(Debug, Clone, Default)]
pub struct Snapshot<'a> {
    module: Option<&'a str>,
    nodes: Vec<Node<'a>>,
    roots: Vec<(&'a str, ValueId)>,
    root_index: HashMap<&'a str, ValueId>,
    /// Sorted by address, non-overlapping.
    segments: Vec<Segment<'a>>,
}

impl<'a> Snapshot<'a> {
    /// Parse snapshot text, interning names into `arena`.
    pub fn parse(arena: &'a Bump, text: &str) -> Result<Self, SnapshotError> {
        parser::parse_snapshot(arena, text)
    }

    /// Name of the current module, if the snapshot declares one.
    pub fn module(&self) -> Option<&'a str> {
        self.module
    }

    /// Named values in file order.
    pub fn roots(&self) -> impl Iterator<Item = (&'a str, ValueId)> + '_ {
        self.roots.iter().copied()
    }

    pub fn root(&self, name: &str) -> Option<ValueId> {
        self.root_index.get(name).copied()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn node(&self, value: ValueId) -> &Node<'_> {
        &self.nodes[value.index()]
    }

    pub(crate) fn set_module(&mut self, name: &'a str) {
        self.module = Some(name);
    }

    pub(crate) fn push_node(&mut self, node: Node<'a>) -> ValueId {
        let id = ValueId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn add_root(&mut self, name: &'a str, value: ValueId) -> Result<(), SnapshotError> {
        if self.root_index.insert(name, value).is_some() {
            return Err(SnapshotError::DuplicateValue {
                name: name.to_string(),
            });
        }
        self.roots.push((name, value));
        Ok(())
    }

    pub(crate) fn add_segment(&mut self, address: u64, bytes: &'a [u8]) {
        self.segments.push(Segment { address, bytes });
    }

    /// Sort segments and reject overlaps.
    pub(crate) fn seal(&mut self) -> Result<(), SnapshotError> {
        self.segments.sort_by_key(|segment| segment.address);
        for pair in self.segments.windows(2) {
            let end = u128::from(pair[0].address) + pair[0].bytes.len() as u128;
            if end > u128::from(pair[1].address) {
                return Err(SnapshotError::OverlappingMemory {
                    address: pair[1].address,
                });
            }
        }
        Ok(())
    }
}

impl MemoryReader for Snapshot<'_> {
    fn read_memory(&self, address: u64, buf: &mut [u8]) -> Result<(), HostError> {
        if buf.is_empty() {
            return Ok(());
        }

        let len = buf.len();
        let unreadable = || HostError::UnreadableMemory { address, len };
        let after = self
            .segments
            .partition_point(|segment| segment.address <= address);
        let segment = after
            .checked_sub(1)
            .map(|index| &self.segments[index])
            .ok_or_else(unreadable)?;

        let offset = usize::try_from(address - segment.address).map_err(|_| unreadable())?;
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= segment.bytes.len())
            .ok_or_else(unreadable)?;
        buf.copy_from_slice(&segment.bytes[offset..end]);
        Ok(())
    }
}

impl HostInspector for Snapshot<'_> {
    type ValueRef = ValueId;

    fn value_type(&self, value: ValueId) -> TypeDescriptor<'_> {
        match *self.node(value) {
            Node::Int(_) => TypeDescriptor::new(TypeCode::Int, None),
            Node::Ptr(_) => TypeDescriptor::new(TypeCode::Pointer, None),
            Node::Struct { tag, .. } => TypeDescriptor::new(TypeCode::Struct, Some(tag)),
        }
    }

    fn field(&self, value: ValueId, name: &str) -> Option<ValueId> {
        match *self.node(value) {
            Node::Struct { fields, .. } => fields
                .iter()
                .find(|(field, _)| *field == name)
                .map(|&(_, id)| id),
            _ => None,
        }
    }

    fn fields(&self, value: ValueId) -> Box<dyn Iterator<Item = (&str, ValueId)> + '_> {
        match *self.node(value) {
            Node::Struct { fields, .. } => Box::new(fields.iter().copied()),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn as_integer(&self, value: ValueId) -> Option<i128> {
        match *self.node(value) {
            Node::Int(n) => Some(n),
            _ => None,
        }
    }

    fn as_address(&self, value: ValueId) -> Option<u64> {
        match *self.node(value) {
            Node::Ptr(address) => Some(address),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
; two segments and one value
module "app"
memory 0x2000 = [68 69]
memory 0x1000 = "hello"
value s = struct Pair { a: int -3  b: ptr 0x1000 }
"#;

    #[test]
    fn test_type_and_fields() {
        let arena = Bump::new();
        let snap = Snapshot::parse(&arena, SOURCE).unwrap();
        let s = snap.root("s").unwrap();

        assert_eq!(
            snap.value_type(s),
            TypeDescriptor::new(TypeCode::Struct, Some("Pair"))
        );
        let names: Vec<_> = snap.fields(s).map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "b"]);

        let a = snap.field(s, "a").unwrap();
        assert_eq!(snap.as_integer(a), Some(-3));
        assert_eq!(snap.as_address(a), None);
        let b = snap.field(s, "b").unwrap();
        assert_eq!(snap.as_address(b), Some(0x1000));
        assert_eq!(snap.field(s, "c"), None);
        assert_eq!(snap.field(a, "x"), None);
    }

    #[test]
    fn test_module_and_roots() {
        let arena = Bump::new();
        let snap = Snapshot::parse(&arena, SOURCE).unwrap();
        assert_eq!(snap.module(), Some("app"));
        assert_eq!(snap.roots().count(), 1);
        assert_eq!(snap.segment_count(), 2);
    }

    #[test]
    fn test_read_memory_bounds() {
        let arena = Bump::new();
        let snap = Snapshot::parse(&arena, SOURCE).unwrap();

        let mut buf = [0u8; 3];
        snap.read_memory(0x1001, &mut buf).unwrap();
        assert_eq!(&buf, b"ell");

        let mut two = [0u8; 2];
        snap.read_memory(0x2000, &mut two).unwrap();
        assert_eq!(&two, b"hi");

        assert!(snap.read_memory(0x1003, &mut buf).is_err());
        assert!(snap.read_memory(0x0fff, &mut buf).is_err());
        assert!(snap.read_memory(0x1800, &mut buf).is_err());
        assert!(snap.read_memory(0, &mut []).is_ok());
    }

    #[test]
    fn test_overlapping_segments_rejected() {
        let arena = Bump::new();
        let err = Snapshot::parse(&arena, "memory 0x10 = \"abcd\"\nmemory 0x12 = \"x\"").unwrap_err();
        assert_eq!(err, SnapshotError::OverlappingMemory { address: 0x12 });
    }

    #[test]
    fn test_duplicate_value_rejected() {
        let arena = Bump::new();
        let err = Snapshot::parse(&arena, "value a = int 1\nvalue a = int 2").unwrap_err();
        assert_eq!(
            err,
            SnapshotError::DuplicateValue {
                name: "a".to_string()
            }
        );
    }
}
