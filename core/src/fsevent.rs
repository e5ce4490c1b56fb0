//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! Atomic update deltas.

use crate::data::Pair;
use crate::fsentry::EntryId;
use crate::statx::Statx;

/// A `(parent_id, name)` link target, shared by [`Fsevent::Link`] and
/// [`Fsevent::Unlink`].
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub parent_id: EntryId,
    pub name: Box<str>,
}

/// The xattr delta carried by [`Fsevent::Upsert`]/[`Fsevent::Xattr`]: each
/// pair's `value: None` unsets that key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XattrDelta {
    pub ns_xattrs: Vec<Pair>,
    pub inode_xattrs: Vec<Pair>,
}

impl XattrDelta {
    pub fn is_empty(&self) -> bool {
        self.ns_xattrs.is_empty() && self.inode_xattrs.is_empty()
    }
}

/// An atomic update delta.
///
/// `Link` is treated as semantically equivalent to an `Unlink` of any prior
/// name for `id` followed by an `Upsert` of the new `(parent_id, name)`
/// pair, never a `$push`-style append. [`crate::backend::Backend::update`]
/// implementations must honor that reading.
#[derive(Debug, Clone, PartialEq)]
pub enum Fsevent {
    /// Full or partial state for `id`. At least one of `stat`/`xattrs`
    /// should be populated; an empty upsert is a no-op but not an error.
    Upsert {
        id: EntryId,
        stat: Option<Statx>,
        xattrs: Option<XattrDelta>,
    },
    Link { id: EntryId, ns: Namespace },
    Unlink { id: EntryId, ns: Namespace },
    /// Removes the entry entirely, regardless of how many names it has.
    Delete { id: EntryId },
    Xattr { id: EntryId, delta: XattrDelta },
}

impl Fsevent {
    pub fn id(&self) -> &EntryId {
        match self {
            Self::Upsert { id, .. }
            | Self::Link { id, .. }
            | Self::Unlink { id, .. }
            | Self::Delete { id }
            | Self::Xattr { id, .. } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xattr_delta_empty() {
        assert!(XattrDelta::default().is_empty());
    }

    #[test]
    fn event_id_accessor_covers_every_variant() {
        let id = EntryId::new(*b"x");
        let events = vec![
            Fsevent::Upsert {
                id: id.clone(),
                stat: None,
                xattrs: None,
            },
            Fsevent::Delete { id: id.clone() },
        ];
        for e in events {
            assert_eq!(e.id(), &id);
        }
    }
}
