//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The filter intermediate representation: an AST of
//! comparisons and logical combinators every backend must either evaluate
//! directly (the in-memory reference backend, `rbh-mongo`'s `MemStore`) or
//! translate into its own query language.

use super::field::Field;
use crate::data::{Value, ValueKind};
use crate::error::{Error, Result};
use crate::mem::ScratchStack;

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    Regex,
    Exists,
    BitsAnySet,
    BitsAllSet,
    BitsAnyUnset,
    BitsAllUnset,
}

impl Operator {
    /// Which value kinds this operator's right-hand operand may carry.
    /// `REGEX` requires a regex value; this generalizes that rule to every
    /// operator so `validate` has one rule per operator instead of one
    /// special case.
    fn admits(&self, kind: ValueKind) -> bool {
        use ValueKind::*;
        match self {
            Operator::Eq | Operator::Ne => !matches!(kind, Sequence | Map),
            Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
                matches!(kind, Int32 | Uint32 | Int64 | Uint64 | Str | Bin)
            }
            Operator::In => matches!(kind, Sequence),
            Operator::Regex => matches!(kind, Regex),
            Operator::Exists => true,
            Operator::BitsAnySet
            | Operator::BitsAllSet
            | Operator::BitsAnyUnset
            | Operator::BitsAllUnset => matches!(kind, Int32 | Uint32 | Int64 | Uint64),
        }
    }
}

/// A logical combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

/// A filter: a comparison, a logical combination of filters, or the null
/// filter that matches everything.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Compare {
        field: Field,
        op: Operator,
        value: Value,
    },
    Logical {
        op: LogicalOp,
        children: Vec<Filter>,
    },
    /// Matches everything.
    True,
}

impl Filter {
    pub fn compare(field: Field, op: Operator, value: Value) -> Result<Self> {
        let f = Self::Compare { field, op, value };
        f.validate()?;
        Ok(f)
    }

    pub fn and(children: Vec<Filter>) -> Result<Self> {
        let f = Self::Logical {
            op: LogicalOp::And,
            children,
        };
        f.validate()?;
        Ok(f)
    }

    pub fn or(children: Vec<Filter>) -> Result<Self> {
        let f = Self::Logical {
            op: LogicalOp::Or,
            children,
        };
        f.validate()?;
        Ok(f)
    }

    pub fn not(child: Filter) -> Result<Self> {
        let f = Self::Logical {
            op: LogicalOp::Not,
            children: vec![child],
        };
        f.validate()?;
        Ok(f)
    }

    /// Recursively enforces this filter's invariants: compare operators
    /// only admit the value kinds their semantics support, logical child
    /// arrays
    /// respect their arity (`NOT` exactly one, `AND`/`OR` at least one),
    /// and every named field resolves (computed fields must name two
    /// distinct, already-valid sub-fields).
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::True => Ok(()),
            Self::Compare { field, op, value } => {
                value.validate()?;
                if !op.admits(value.kind()) {
                    return Err(Error::inval(format!(
                        "operator {op:?} does not admit value kind {:?}",
                        value.kind()
                    )));
                }
                Self::validate_field(field)
            }
            Self::Logical { op, children } => {
                match op {
                    LogicalOp::Not if children.len() != 1 => {
                        return Err(Error::inval("NOT takes exactly one child"));
                    }
                    LogicalOp::And | LogicalOp::Or if children.is_empty() => {
                        return Err(Error::inval("AND/OR need at least one child"));
                    }
                    _ => {}
                }
                for child in children {
                    child.validate()?;
                }
                Ok(())
            }
        }
    }

    fn validate_field(field: &Field) -> Result<()> {
        if let Field::Computed(a, b) = field {
            Self::validate_field(a)?;
            Self::validate_field(b)?;
        }
        Ok(())
    }

    /// Deep-clone `self`, charging every literal's payload against `buf`'s
    /// budget (analogue of `filter_data_size`/clone-into-buffer).
    pub fn clone_checked(&self, buf: &ScratchStack) -> Result<Filter> {
        match self {
            Self::True => Ok(Self::True),
            Self::Compare { field, op, value } => Ok(Self::Compare {
                field: field.clone(),
                op: *op,
                value: value.clone_checked(buf)?,
            }),
            Self::Logical { op, children } => {
                let children = children
                    .iter()
                    .map(|c| c.clone_checked(buf))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::Logical { op: *op, children })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RegexOptions;

    #[test]
    fn regex_requires_regex_value() {
        let err = Filter::compare(Field::Name, Operator::Regex, Value::str("abc"));
        assert!(err.is_err());
        let ok = Filter::compare(
            Field::Name,
            Operator::Regex,
            Value::regex("^a.*", RegexOptions::NONE).unwrap(),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn not_requires_exactly_one_child() {
        assert!(Filter::not(Filter::True).is_ok());
        let f = Filter::Logical {
            op: LogicalOp::Not,
            children: vec![Filter::True, Filter::True],
        };
        assert!(f.validate().is_err());
    }

    #[test]
    fn and_or_require_nonempty_children() {
        let f = Filter::Logical {
            op: LogicalOp::And,
            children: vec![],
        };
        assert!(f.validate().is_err());
    }

    #[test]
    fn in_requires_sequence() {
        assert!(Filter::compare(Field::Name, Operator::In, Value::str("x")).is_err());
        let ok = Filter::compare(
            Field::Name,
            Operator::In,
            Value::Sequence(vec![Value::str("a"), Value::str("b")]),
        );
        assert!(ok.is_ok());
    }
}
