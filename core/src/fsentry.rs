//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The canonical filesystem record.

use crate::data::Pair;
use crate::error::{Error, Result};
use crate::statx::Statx;
use std::fmt;

/// An opaque binary identifier, unique within a store.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(Box<[u8]>);

impl EntryId {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self(bytes.into())
    }

    /// The distinguished empty id: every store has exactly one entry whose
    /// `parent_id` is this value (the root).
    pub fn root() -> Self {
        Self(Box::new([]))
    }

    pub fn is_root_marker(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", hex_digest(&self.0))
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// One filesystem entry as stored by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Fsentry {
    pub id: EntryId,
    /// Empty (`EntryId::root()`) for the root of a store.
    pub parent_id: EntryId,
    /// `None` only for the root entry.
    pub name: Option<Box<str>>,
    pub stat: Statx,
    pub ns_xattrs: Vec<Pair>,
    pub inode_xattrs: Vec<Pair>,
    pub symlink: Option<Box<str>>,
}

impl Fsentry {
    /// Builds an `Fsentry`, checking the invariants a single entry must
    /// satisfy in isolation (cross-entry invariants — uniqueness of
    /// `(parent_id, name)`, parent resolution, exactly one root — are a
    /// store-wide property a backend enforces across its whole collection,
    /// not something a single constructor call can see).
    ///
    /// This mirrors `fsentry_new`'s role without its single-allocation
    /// layout trick: Rust's ordinary ownership already gives every
    /// argument here its own heap allocation, so there's no partial
    /// allocation to unwind on failure.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntryId,
        parent_id: EntryId,
        name: Option<Box<str>>,
        stat: Statx,
        ns_xattrs: Vec<Pair>,
        inode_xattrs: Vec<Pair>,
        symlink: Option<Box<str>>,
    ) -> Result<Self> {
        let is_root = parent_id.is_root_marker();
        let name_is_empty = matches!(&name, None) || matches!(&name, Some(n) if n.is_empty());
        if !is_root && name_is_empty {
            return Err(Error::inval("non-root entry must carry a non-empty name"));
        }
        if is_root && name.is_some() {
            return Err(Error::inval("root entry must not carry a name"));
        }
        Ok(Self {
            id,
            parent_id,
            name,
            stat,
            ns_xattrs,
            inode_xattrs,
            symlink,
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_root_marker()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_entry_has_no_name() {
        let e = Fsentry::new(
            EntryId::new(*b"root"),
            EntryId::root(),
            None,
            Statx::default(),
            vec![],
            vec![],
            None,
        )
        .unwrap();
        assert!(e.is_root());
    }

    #[test]
    fn non_root_requires_name() {
        let err = Fsentry::new(
            EntryId::new(*b"child"),
            EntryId::new(*b"root"),
            None,
            Statx::default(),
            vec![],
            vec![],
            None,
        );
        assert!(err.is_err());
    }
}
