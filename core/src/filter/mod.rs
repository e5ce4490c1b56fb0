//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The filter intermediate representation.

mod ast;
mod eval;
mod field;

pub use ast::{Filter, LogicalOp, Operator};
pub use field::Field;
