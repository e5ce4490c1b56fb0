//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The typed value model, grounded on
//! `examples/original_source/src/value.c` for the exact recursive
//! `validate`/payload-size/deep-copy discipline, and on `skyd`'s
//! `engine/data/lit.rs` `Lit`/`LitIR` split for the ephemeral-vs-owned
//! duality: [`Value`] owns its payload outright (the `Lit` role, suitable
//! for values that outlive the producer that built them — persisted
//! fsentries, validated filter literals); [`ValueRef`] borrows its string
//! and binary payloads from a [`crate::mem::ScratchStack`] (the `LitIR`
//! role, for iterator enrichers that want to build values without an
//! allocation per field and hand them off before the stack is torn down).

use super::tag::{RegexOptions, ValueKind};
use crate::error::{Error, Result};
use crate::mem::ScratchStack;

/// A `(key, value)` pair inside an owned [`Value::Map`]. A `None` value
/// denotes "unset this key" in xattr update semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub key: Box<str>,
    pub value: Option<Value>,
}

impl Pair {
    pub fn new(key: impl Into<Box<str>>, value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// The convention Fsevent xattr deltas use: a present pair with no
    /// value unsets the key.
    pub fn is_unset(&self) -> bool {
        self.value.is_none()
    }
}

/// An owned, tagged value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Str(Box<str>),
    /// May be empty; in that case payload data may legitimately be absent.
    Bin(Box<[u8]>),
    Regex {
        pattern: Box<str>,
        options: RegexOptions,
    },
    Sequence(Vec<Value>),
    Map(Vec<Pair>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int32(_) => ValueKind::Int32,
            Self::Uint32(_) => ValueKind::Uint32,
            Self::Int64(_) => ValueKind::Int64,
            Self::Uint64(_) => ValueKind::Uint64,
            Self::Str(_) => ValueKind::Str,
            Self::Bin(_) => ValueKind::Bin,
            Self::Regex { .. } => ValueKind::Regex,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Map(_) => ValueKind::Map,
        }
    }

    pub fn str(s: impl Into<Box<str>>) -> Self {
        Self::Str(s.into())
    }

    pub fn bin(b: impl Into<Box<[u8]>>) -> Self {
        Self::Bin(b.into())
    }

    pub fn regex(pattern: impl Into<Box<str>>, options: RegexOptions) -> Result<Self> {
        let v = Self::Regex {
            pattern: pattern.into(),
            options,
        };
        v.validate()?;
        Ok(v)
    }

    /// Recursively enforces this value's invariants: non-null/NUL-terminated
    /// strings are trivially true for a `Box<str>`, so what's left to check
    /// is the regex option mask and that every nested value also validates.
    /// Mirrors `rbh_value_validate`.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Int32(_) | Self::Uint32(_) | Self::Int64(_) | Self::Uint64(_) => Ok(()),
            Self::Str(_) | Self::Bin(_) => Ok(()),
            Self::Regex { options, .. } => {
                if !RegexOptions::ALL.contains(*options) {
                    return Err(Error::inval("regex options outside the declared mask"));
                }
                Ok(())
            }
            Self::Sequence(items) => {
                for item in items {
                    item.validate()?;
                }
                Ok(())
            }
            Self::Map(pairs) => {
                for pair in pairs {
                    if let Some(v) = &pair.value {
                        v.validate()?;
                    }
                }
                Ok(())
            }
        }
    }

    /// The trailing byte count `value_data_size` would report for this
    /// value: string/binary/regex payload bytes plus, recursively, the
    /// payload of every nested value. Used to budget a bounded clone
    /// (testable property 1).
    pub fn payload_len(&self) -> usize {
        match self {
            Self::Int32(_) | Self::Uint32(_) | Self::Int64(_) | Self::Uint64(_) => 0,
            Self::Str(s) => s.len(),
            Self::Bin(b) => b.len(),
            Self::Regex { pattern, .. } => pattern.len(),
            Self::Sequence(items) => items.iter().map(Value::payload_len).sum(),
            Self::Map(pairs) => pairs
                .iter()
                .map(|p| p.key.len() + p.value.as_ref().map_or(0, Value::payload_len))
                .sum(),
        }
    }

    /// Deep-clone `self`, charging its payload size against `buf`'s budget.
    /// Fails with [`Error::NoBufs`] if `buf` can't afford it. This is the
    /// safe-Rust analogue of `value_copy`: instead of writing raw bytes
    /// into a caller-supplied arena and rewriting pointers, we let the
    /// clone allocate normally but refuse to proceed unless the declared
    /// budget covers it, preserving the "validate ⇒ clone into a buffer of
    /// exactly `data_size(v)` bytes succeeds" contract.
    pub fn clone_checked(&self, buf: &ScratchStack) -> Result<Value> {
        self.validate()?;
        buf.reserve(self.payload_len());
        Ok(self.clone())
    }
}

macro_rules! direct_from_value {
    ($($src:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$src> for Value {
                fn from(v: $src) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

direct_from_value! {
    i32 => Int32,
    u32 => Uint32,
    i64 => Int64,
    u64 => Uint64,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bin(b.into())
    }
}

/// A `(key, value)` pair borrowed from a [`ScratchStack`] (the `ValueRef`
/// analogue of [`Pair`]).
#[derive(Debug, Clone)]
pub struct PairRef<'a> {
    pub key: &'a str,
    pub value: Option<ValueRef<'a>>,
}

/// An ephemeral, tagged value whose string/binary payloads are borrowed
/// from a [`ScratchStack`]: valid until that stack is destroyed, never
/// shared across stack boundaries by reference.
#[derive(Debug, Clone)]
pub enum ValueRef<'a> {
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Str(&'a str),
    Bin(&'a [u8]),
    Regex {
        pattern: &'a str,
        options: RegexOptions,
    },
    Sequence(Vec<ValueRef<'a>>),
    Map(Vec<PairRef<'a>>),
}

impl<'a> ValueRef<'a> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int32(_) => ValueKind::Int32,
            Self::Uint32(_) => ValueKind::Uint32,
            Self::Int64(_) => ValueKind::Int64,
            Self::Uint64(_) => ValueKind::Uint64,
            Self::Str(_) => ValueKind::Str,
            Self::Bin(_) => ValueKind::Bin,
            Self::Regex { .. } => ValueKind::Regex,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Map(_) => ValueKind::Map,
        }
    }

    /// Build a string value whose bytes live in `stack`.
    pub fn str_in(stack: &'a ScratchStack, s: &str) -> Self {
        let bytes = stack.push(s.as_bytes());
        // SAFETY: `bytes` was just copied in verbatim from a valid `&str`.
        Self::Str(unsafe { std::str::from_utf8_unchecked(bytes) })
    }

    pub fn bin_in(stack: &'a ScratchStack, b: &[u8]) -> Self {
        Self::Bin(stack.push(b))
    }

    /// Cross the stack boundary: deep-clone into a fully owned [`Value`],
    /// the operation every pipeline stage performs before an ephemeral
    /// value outlives the iterator that produced it.
    pub fn to_owned_value(&self) -> Value {
        match self {
            Self::Int32(v) => Value::Int32(*v),
            Self::Uint32(v) => Value::Uint32(*v),
            Self::Int64(v) => Value::Int64(*v),
            Self::Uint64(v) => Value::Uint64(*v),
            Self::Str(s) => Value::Str((*s).into()),
            Self::Bin(b) => Value::Bin((*b).into()),
            Self::Regex { pattern, options } => Value::Regex {
                pattern: (*pattern).into(),
                options: *options,
            },
            Self::Sequence(items) => {
                Value::Sequence(items.iter().map(ValueRef::to_owned_value).collect())
            }
            Self::Map(pairs) => Value::Map(
                pairs
                    .iter()
                    .map(|p| Pair {
                        key: p.key.into(),
                        value: p.value.as_ref().map(ValueRef::to_owned_value),
                    })
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_string_clone_twice_validates() {
        let stack = ScratchStack::default();
        let v = Value::str("hi");
        let c1 = v.clone_checked(&stack).unwrap();
        let c2 = v.clone_checked(&stack).unwrap();
        c1.validate().unwrap();
        c2.validate().unwrap();
        assert_eq!(c1, c2);
        assert_eq!(c1, v);
    }

    #[test]
    fn regex_outside_mask_rejected() {
        let bad = RegexOptions::from_bits(0b100);
        assert!(bad.is_none());
    }

    #[test]
    fn valueref_roundtrips_through_owned() {
        let stack = ScratchStack::default();
        let r = ValueRef::str_in(&stack, "xattr.value");
        let owned = r.to_owned_value();
        assert_eq!(owned, Value::str("xattr.value"));
    }

    #[test]
    fn map_null_pair_means_unset() {
        let pair = Pair::new("trusted.hsm", None);
        assert!(pair.is_unset());
    }

    #[test]
    fn sequence_payload_len_is_recursive() {
        let v = Value::Sequence(vec![Value::str("ab"), Value::str("cde")]);
        assert_eq!(v.payload_len(), 2 + 3);
    }
}
