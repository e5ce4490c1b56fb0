//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! In-process filter evaluation against an [`Fsentry`]: the reference
//! semantics every backend's own translation (a Mongo query document, a
//! Lustre Changelog predicate, ...) must agree with. Used directly by the
//! in-memory reference sink backend and by testable property 2:
//! "if `B.filter(f)` yields an entry `e`, then `f.evaluate(e) = true`".

use super::ast::{Filter, LogicalOp, Operator};
use super::field::Field;
use crate::data::Value;
use crate::fsentry::Fsentry;
use crate::statx::StatxField;

impl Filter {
    /// Evaluate this filter against `entry`.
    pub fn evaluate(&self, entry: &Fsentry) -> bool {
        match self {
            Self::True => true,
            Self::Logical { op, children } => match op {
                LogicalOp::And => children.iter().all(|c| c.evaluate(entry)),
                LogicalOp::Or => children.iter().any(|c| c.evaluate(entry)),
                LogicalOp::Not => !children[0].evaluate(entry),
            },
            Self::Compare { field, op, value } => eval_compare(field, *op, value, entry),
        }
    }
}

fn eval_compare(field: &Field, op: Operator, rhs: &Value, entry: &Fsentry) -> bool {
    if op == Operator::Exists {
        return resolve(field, entry).is_some();
    }
    let lhs = match resolve(field, entry) {
        Some(v) => v,
        None => return false,
    };
    match op {
        Operator::Eq => values_eq(&lhs, rhs),
        Operator::Ne => !values_eq(&lhs, rhs),
        Operator::Lt => compare_ord(&lhs, rhs) == Some(std::cmp::Ordering::Less),
        Operator::Le => matches!(
            compare_ord(&lhs, rhs),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        ),
        Operator::Gt => compare_ord(&lhs, rhs) == Some(std::cmp::Ordering::Greater),
        Operator::Ge => matches!(
            compare_ord(&lhs, rhs),
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        ),
        Operator::In => match rhs {
            Value::Sequence(items) => items.iter().any(|v| values_eq(&lhs, v)),
            _ => false,
        },
        Operator::Regex => eval_regex(&lhs, rhs),
        Operator::Exists => unreachable!("handled above"),
        Operator::BitsAnySet => bits(&lhs, rhs, |a, b| a & b != 0),
        Operator::BitsAllSet => bits(&lhs, rhs, |a, b| a & b == b),
        Operator::BitsAnyUnset => bits(&lhs, rhs, |a, b| a & b != b),
        Operator::BitsAllUnset => bits(&lhs, rhs, |a, b| a & b == 0),
    }
}

fn as_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Int32(i) => Some(*i as u64),
        Value::Uint32(u) => Some(*u as u64),
        Value::Int64(i) => Some(*i as u64),
        Value::Uint64(u) => Some(*u),
        _ => None,
    }
}

fn bits(lhs: &Value, rhs: &Value, f: impl Fn(u64, u64) -> bool) -> bool {
    match (as_u64(lhs), as_u64(rhs)) {
        (Some(a), Some(b)) => f(a, b),
        _ => false,
    }
}

fn values_eq(a: &Value, b: &Value) -> bool {
    if a.kind().is_integer() && b.kind().is_integer() {
        return as_u64(a) == as_u64(b);
    }
    a == b
}

fn compare_ord(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    if a.kind().is_integer() && b.kind().is_integer() {
        return as_u64(a).partial_cmp(&as_u64(b));
    }
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        (Value::Bin(x), Value::Bin(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn eval_regex(lhs: &Value, rhs: &Value) -> bool {
    let (pattern, options) = match rhs {
        Value::Regex { pattern, options } => (pattern, *options),
        _ => return false,
    };
    let haystack = match lhs {
        Value::Str(s) => s.as_ref(),
        _ => return false,
    };
    let re = match regex::RegexBuilder::new(pattern)
        .case_insensitive(options.case_insensitive())
        .multi_line(options.multiline())
        .build()
    {
        Ok(re) => re,
        Err(_) => return false,
    };
    re.is_match(haystack)
}

fn resolve(field: &Field, entry: &Fsentry) -> Option<Value> {
    match field {
        Field::Id => Some(Value::bin(entry.id.as_bytes())),
        Field::ParentId => Some(Value::bin(entry.parent_id.as_bytes())),
        Field::Name => entry.name.as_ref().map(|n| Value::str(n.as_ref())),
        Field::Symlink => entry.symlink.as_ref().map(|s| Value::str(s.as_ref())),
        Field::Statx(s) => resolve_statx(*s, entry),
        Field::NsXattr(None) => Some(Value::Map(entry.ns_xattrs.clone())),
        Field::NsXattr(Some(key)) => lookup_xattr(&entry.ns_xattrs, key),
        Field::InodeXattr(None) => Some(Value::Map(entry.inode_xattrs.clone())),
        Field::InodeXattr(Some(key)) => lookup_xattr(&entry.inode_xattrs, key),
        Field::Computed(a, b) => {
            let av = as_u64(&resolve(a, entry)?)?;
            let bv = as_u64(&resolve(b, entry)?)?;
            Some(Value::Uint64(av + bv))
        }
    }
}

fn lookup_xattr(pairs: &[crate::data::Pair], key: &str) -> Option<Value> {
    pairs
        .iter()
        .find(|p| p.key.as_ref() == key)
        .and_then(|p| p.value.clone())
}

fn resolve_statx(field: StatxField, entry: &Fsentry) -> Option<Value> {
    let st = &entry.stat;
    match field {
        StatxField::Type => st.r#type.map(|t| Value::Uint32(t.tag())),
        StatxField::Mode => st.mode.map(|m| Value::Uint32(m as u32)),
        StatxField::Nlink => st.nlink.map(Value::Uint32),
        StatxField::Uid => st.uid.map(Value::Uint32),
        StatxField::Gid => st.gid.map(Value::Uint32),
        StatxField::Ino => st.ino.map(Value::Uint64),
        StatxField::Size => st.size.map(Value::Uint64),
        StatxField::Blocks => st.blocks.map(Value::Uint64),
        StatxField::Blksize => st.blksize.map(Value::Uint32),
        StatxField::Attributes => st.attributes.map(Value::Uint64),
        StatxField::AtimeSec => st.atime_sec.map(Value::Int64),
        StatxField::AtimeNsec => st.atime_nsec.map(Value::Uint32),
        StatxField::BtimeSec => st.btime_sec.map(Value::Int64),
        StatxField::BtimeNsec => st.btime_nsec.map(Value::Uint32),
        StatxField::CtimeSec => st.ctime_sec.map(Value::Int64),
        StatxField::CtimeNsec => st.ctime_nsec.map(Value::Uint32),
        StatxField::MtimeSec => st.mtime_sec.map(Value::Int64),
        StatxField::MtimeNsec => st.mtime_nsec.map(Value::Uint32),
        StatxField::RdevMajor => st.rdev_major.map(Value::Uint32),
        StatxField::RdevMinor => st.rdev_minor.map(Value::Uint32),
        StatxField::DevMajor => st.dev_major.map(Value::Uint32),
        StatxField::DevMinor => st.dev_minor.map(Value::Uint32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsentry::EntryId;
    use crate::statx::{FileType, Statx};

    fn entry(name: &str, size: u64) -> Fsentry {
        Fsentry::new(
            EntryId::new(name.as_bytes().to_vec()),
            EntryId::new(*b"parent"),
            Some(name.into()),
            Statx {
                r#type: Some(FileType::Regular),
                size: Some(size),
                ..Default::default()
            },
            vec![],
            vec![],
            None,
        )
        .unwrap()
    }

    #[test]
    fn compare_eq_on_name() {
        let f = Filter::compare(Field::Name, Operator::Eq, Value::str("a")).unwrap();
        assert!(f.evaluate(&entry("a", 0)));
        assert!(!f.evaluate(&entry("b", 0)));
    }

    #[test]
    fn compare_gt_on_size() {
        let f = Filter::compare(Field::Statx(StatxField::Size), Operator::Gt, Value::Uint64(10))
            .unwrap();
        assert!(f.evaluate(&entry("a", 20)));
        assert!(!f.evaluate(&entry("a", 5)));
    }

    #[test]
    fn and_or_not_compose() {
        let big = Filter::compare(Field::Statx(StatxField::Size), Operator::Gt, Value::Uint64(10))
            .unwrap();
        let named_a = Filter::compare(Field::Name, Operator::Eq, Value::str("a")).unwrap();
        let both = Filter::and(vec![big.clone(), named_a.clone()]).unwrap();
        assert!(both.evaluate(&entry("a", 20)));
        assert!(!both.evaluate(&entry("b", 20)));

        let either = Filter::or(vec![big, named_a]).unwrap();
        assert!(either.evaluate(&entry("b", 20)));

        let not_a = Filter::not(Filter::compare(Field::Name, Operator::Eq, Value::str("a")).unwrap())
            .unwrap();
        assert!(not_a.evaluate(&entry("b", 0)));
        assert!(!not_a.evaluate(&entry("a", 0)));
    }

    #[test]
    fn exists_checks_presence_only() {
        let f = Filter::compare(Field::Symlink, Operator::Exists, Value::Uint32(0)).unwrap();
        assert!(!f.evaluate(&entry("a", 0)));
    }
}
