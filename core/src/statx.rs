//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The extended statx-like record, supplemented from
//! `examples/original_source/include/robinhood/statx.h` and the field
//! switch in `src/backends/mongo/fields.c` with the exact attribute set a
//! complete implementation needs: the baseline `statx(2)` fields plus
//! robinhood's own `RBH_STATX_*` extensions (nanosecond timestamps and
//! major/minor device components).
//!
//! Each field is independently present-or-absent, matching statx's partial
//! population model — a source backend only fills in what it actually
//! queried.

/// Which [`Statx`] fields are populated. One bit per field, mirroring the
/// `STATX_*`/`RBH_STATX_*` mask bits in the original header.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatxMask(u32);

macro_rules! statx_bits {
    ($($name:ident = $bit:expr),* $(,)?) => {
        impl StatxMask {
            $(pub const $name: Self = Self(1 << $bit);)*
            pub const ALL: Self = Self($(Self::$name.0 |)* 0);

            pub const fn empty() -> Self { Self(0) }
            pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }
            pub const fn insert(self, other: Self) -> Self { Self(self.0 | other.0) }
        }
    };
}

statx_bits! {
    TYPE = 0, MODE = 1, NLINK = 2, UID = 3, GID = 4,
    ATIME_SEC = 5, MTIME_SEC = 6, CTIME_SEC = 7, BTIME_SEC = 8,
    INO = 9, SIZE = 10, BLOCKS = 11, BLKSIZE = 12, ATTRIBUTES = 13,
    ATIME_NSEC = 14, BTIME_NSEC = 15, CTIME_NSEC = 16, MTIME_NSEC = 17,
    RDEV_MAJOR = 18, RDEV_MINOR = 19, DEV_MAJOR = 20, DEV_MINOR = 21,
}

impl std::ops::BitOr for StatxMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.insert(rhs)
    }
}

/// A POSIX entry type, as carried by `statx.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Regular,
    Directory,
    Symlink,
    BlockDevice,
    CharDevice,
    Fifo,
    Socket,
}

/// The extended, partially-populated statx-like record. Every
/// field is `Option`; [`Statx::mask`] always agrees with which fields are
/// `Some`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Statx {
    pub r#type: Option<FileType>,
    pub mode: Option<u16>,
    pub nlink: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub ino: Option<u64>,
    pub size: Option<u64>,
    pub blocks: Option<u64>,
    pub blksize: Option<u32>,
    pub attributes: Option<u64>,
    pub atime_sec: Option<i64>,
    pub atime_nsec: Option<u32>,
    pub btime_sec: Option<i64>,
    pub btime_nsec: Option<u32>,
    pub ctime_sec: Option<i64>,
    pub ctime_nsec: Option<u32>,
    pub mtime_sec: Option<i64>,
    pub mtime_nsec: Option<u32>,
    pub rdev_major: Option<u32>,
    pub rdev_minor: Option<u32>,
    pub dev_major: Option<u32>,
    pub dev_minor: Option<u32>,
}

impl Statx {
    /// Recompute the presence mask from which fields are `Some`. Source
    /// backends call this after populating a record from a real `statx(2)`
    /// call so the mask never drifts from the data.
    pub fn mask(&self) -> StatxMask {
        let mut m = StatxMask::empty();
        macro_rules! bit {
            ($field:ident, $flag:ident) => {
                if self.$field.is_some() {
                    m = m.insert(StatxMask::$flag);
                }
            };
        }
        bit!(r#type, TYPE);
        bit!(mode, MODE);
        bit!(nlink, NLINK);
        bit!(uid, UID);
        bit!(gid, GID);
        bit!(ino, INO);
        bit!(size, SIZE);
        bit!(blocks, BLOCKS);
        bit!(blksize, BLKSIZE);
        bit!(attributes, ATTRIBUTES);
        bit!(atime_sec, ATIME_SEC);
        bit!(atime_nsec, ATIME_NSEC);
        bit!(btime_sec, BTIME_SEC);
        bit!(btime_nsec, BTIME_NSEC);
        bit!(ctime_sec, CTIME_SEC);
        bit!(ctime_nsec, CTIME_NSEC);
        bit!(mtime_sec, MTIME_SEC);
        bit!(mtime_nsec, MTIME_NSEC);
        bit!(rdev_major, RDEV_MAJOR);
        bit!(rdev_minor, RDEV_MINOR);
        bit!(dev_major, DEV_MAJOR);
        bit!(dev_minor, DEV_MINOR);
        m
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.r#type, Some(FileType::Directory))
    }
}

impl FileType {
    /// The stable numeric tag this type is compared against in a `Filter`
    /// (`statx.type` carries no sub-document, only this scalar). Used both
    /// by [`crate::filter`]'s evaluator and by the branch traversal engine
    /// when it builds a `type == DIR` predicate.
    pub const fn tag(self) -> u32 {
        match self {
            Self::Regular => 0,
            Self::Directory => 1,
            Self::Symlink => 2,
            Self::BlockDevice => 3,
            Self::CharDevice => 4,
            Self::Fifo => 5,
            Self::Socket => 6,
        }
    }
}

/// The individual statx sub-field a [`crate::filter::Field`] can name.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatxField {
    Type,
    Mode,
    Nlink,
    Uid,
    Gid,
    Ino,
    Size,
    Blocks,
    Blksize,
    Attributes,
    AtimeSec,
    AtimeNsec,
    BtimeSec,
    BtimeNsec,
    CtimeSec,
    CtimeNsec,
    MtimeSec,
    MtimeNsec,
    RdevMajor,
    RdevMinor,
    DevMajor,
    DevMinor,
}
