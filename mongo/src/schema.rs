//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The logical persisted document shape, grounded on the field
//! name macros (`MFF_ID`, `MFF_NAMESPACE`, `MFF_PARENT_ID`, `MFF_NAME`, ...)
//! in `examples/original_source/src/backends/mongo/mongo.c` and
//! `fields.c`. Only the *logical* shape is specified here; the on-wire BSON
//! encoding is out of scope.

use rbh_core::data::Pair;
use rbh_core::statx::Statx;
use rbh_core::EntryId;

/// Top-level dotted field names, mirroring the original driver's `MFF_*`
/// macros.
pub mod field_names {
    pub const ID: &str = "_id";
    pub const NAMESPACE: &str = "ns";
    pub const NS_PARENT: &str = "ns.parent";
    pub const NS_NAME: &str = "ns.name";
    pub const NS_XATTRS: &str = "ns.xattrs";
    pub const SYMLINK: &str = "symlink";
    pub const STATX: &str = "statx";
    pub const XATTRS: &str = "xattrs";
}

/// One element of a document's `ns` array: a name this entry is
/// known by, and the namespace-scoped xattrs attached to that particular
/// link (e.g. an HSM backup path, which is meaningful per-hardlink).
#[derive(Debug, Clone, PartialEq)]
pub struct NsEntry {
    pub parent_id: EntryId,
    pub name: Box<str>,
    pub xattrs: Vec<Pair>,
}

/// One persisted document. A document with an empty `ns` and no
/// incoming links is the store's root.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: EntryId,
    pub ns: Vec<NsEntry>,
    pub stat: Statx,
    pub inode_xattrs: Vec<Pair>,
    pub symlink: Option<Box<str>>,
}

impl Document {
    pub fn new_empty(id: EntryId) -> Self {
        Self {
            id,
            ns: Vec::new(),
            stat: Statx::default(),
            inode_xattrs: Vec::new(),
            symlink: None,
        }
    }

    pub fn find_ns(&self, parent_id: &EntryId, name: &str) -> Option<usize> {
        self.ns
            .iter()
            .position(|e| &e.parent_id == parent_id && e.name.as_ref() == name)
    }
}
