//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The typed value model.

mod tag;
mod value;

pub use tag::{RegexOptions, ValueKind};
pub use value::{Pair, PairRef, Value, ValueRef};
