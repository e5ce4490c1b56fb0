//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! Queryable fields and the dotted-path mapping into the
//! persisted schema, grounded field-by-field on
//! `examples/original_source/src/backends/mongo/fields.c`'s `field2str`.

use crate::error::{Error, Result};
use crate::statx::StatxField;

/// One queryable attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    ParentId,
    Name,
    Symlink,
    Statx(StatxField),
    /// `None` addresses the whole namespace-xattr map; `Some(key)` one key
    /// in it.
    NsXattr(Option<Box<str>>),
    /// `None` addresses the whole inode-xattr map; `Some(key)` one key in
    /// it.
    InodeXattr(Option<Box<str>>),
    /// A computed field: the (backend-defined) combination of two other
    /// fields, e.g. for `size + blocks * 512`-style derived comparisons.
    /// Has no persisted dotted path of its own (`field2str` on it is
    /// `NotSup`) — a backend that can't evaluate it in-process must reject
    /// the filter at `validate` time instead of silently dropping it.
    Computed(Box<Field>, Box<Field>),
}

impl Field {
    fn statx_path(field: StatxField) -> &'static str {
        use StatxField::*;
        match field {
            Type => "statx.type",
            Mode => "statx.mode",
            Nlink => "statx.nlink",
            Uid => "statx.uid",
            Gid => "statx.gid",
            Ino => "statx.ino",
            Size => "statx.size",
            Blocks => "statx.blocks",
            Blksize => "statx.blksize",
            Attributes => "statx.attributes",
            AtimeSec => "statx.atime.sec",
            AtimeNsec => "statx.atime.nsec",
            BtimeSec => "statx.btime.sec",
            BtimeNsec => "statx.btime.nsec",
            CtimeSec => "statx.ctime.sec",
            CtimeNsec => "statx.ctime.nsec",
            MtimeSec => "statx.mtime.sec",
            MtimeNsec => "statx.mtime.nsec",
            RdevMajor => "statx.rdev.major",
            RdevMinor => "statx.rdev.minor",
            DevMajor => "statx.dev.major",
            DevMinor => "statx.dev.minor",
        }
    }

    /// Map this field to its stable dotted path in the persisted schema
    ///. This is the only place that schema leaks outside the
    /// sink backend.
    pub fn field2str(&self) -> Result<String> {
        match self {
            Self::Id => Ok("_id".to_string()),
            Self::ParentId => Ok("ns.parent".to_string()),
            Self::Name => Ok("ns.name".to_string()),
            Self::Symlink => Ok("symlink".to_string()),
            Self::Statx(s) => Ok(Self::statx_path(*s).to_string()),
            Self::NsXattr(None) => Ok("ns.xattrs".to_string()),
            Self::NsXattr(Some(key)) => Ok(format!("ns.xattrs.{key}")),
            Self::InodeXattr(None) => Ok("xattrs".to_string()),
            Self::InodeXattr(Some(key)) => Ok(format!("xattrs.{key}")),
            Self::Computed(_, _) => Err(Error::notsup("computed fields have no persisted path")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_maps_to_mongo_id() {
        assert_eq!(Field::Id.field2str().unwrap(), "_id");
    }

    #[test]
    fn statx_timestamps_split_sec_and_nsec() {
        assert_eq!(
            Field::Statx(StatxField::MtimeSec).field2str().unwrap(),
            "statx.mtime.sec"
        );
        assert_eq!(
            Field::Statx(StatxField::MtimeNsec).field2str().unwrap(),
            "statx.mtime.nsec"
        );
    }

    #[test]
    fn xattr_key_is_appended() {
        assert_eq!(
            Field::NsXattr(Some("fid".into())).field2str().unwrap(),
            "ns.xattrs.fid"
        );
        assert_eq!(
            Field::InodeXattr(None).field2str().unwrap(),
            "xattrs"
        );
    }

    #[test]
    fn computed_field_has_no_path() {
        let f = Field::Computed(Box::new(Field::Id), Box::new(Field::Name));
        assert!(f.field2str().is_err());
    }
}
