//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The MongoDB sink backend: logical document schema, the
//! update/filter translation rules, the wire-driver seam, and an
//! in-memory reference implementation of it all.

pub mod driver;
pub mod memstore;
pub mod schema;

pub use driver::{MongoDriver, WriteOp};
pub use memstore::MemStore;
