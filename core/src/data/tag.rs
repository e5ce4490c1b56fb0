//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! Value tags, grounded on `skyd`'s `engine/data/tag.rs`
//! (`TagClass`/`TagSelector`): a small `#[repr(u8)]` enum identifying a
//! value's shape, kept separate from the value's payload so filters and
//! schema-mapping code can reason about "what kind of thing is this" without
//! touching the data itself.

/// The shape of a [`crate::data::Value`]/[`crate::data::ValueRef`].
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Int32 = 0,
    Uint32 = 1,
    Int64 = 2,
    Uint64 = 3,
    Str = 4,
    Bin = 5,
    Regex = 6,
    Sequence = 7,
    Map = 8,
}

impl ValueKind {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int32 | Self::Uint32 | Self::Int64 | Self::Uint64
        )
    }
}

/// The regex option set a [`crate::data::Value::Regex`] may declare: the
/// concrete mask `original_source/src/value.c`'s `RBH_RO_ALL` leaves
/// unnamed, filled in here as the two options the `regex` crate's
/// `RegexBuilder` can honor.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct RegexOptions(u8);

impl RegexOptions {
    pub const NONE: Self = Self(0);
    pub const CASE_INSENSITIVE: Self = Self(0b01);
    pub const MULTILINE: Self = Self(0b10);
    /// The full set of options `validate` accepts; anything outside this
    /// mask is `Error::Inval`.
    pub const ALL: Self = Self(0b11);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL.0 == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn case_insensitive(self) -> bool {
        self.contains(Self::CASE_INSENSITIVE)
    }

    pub fn multiline(self) -> bool {
        self.contains(Self::MULTILINE)
    }
}

impl std::ops::BitOr for RegexOptions {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}
