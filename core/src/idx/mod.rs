//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! Index structures.

mod hash;
mod hashmap;

pub use hash::{RbhBuildHasher, RbhHasher};
pub use hashmap::RbhHashMap;
