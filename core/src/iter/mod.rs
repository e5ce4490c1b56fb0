//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The iterator algebra: lazy, possibly-failing cursors over
//! heterogeneous sources, composed to build scans, joins, chunking, teeing
//! and tree traversals.
//!
//! Every cursor here is `next() -> element | null` plus a `destroy()`, with
//! `AGAIN` meaning "retry me" and `NODATA` meaning exhaustion. Rust's
//! `Iterator::next() -> Option<Item>` already gives `destroy()` for free
//! (drop the iterator) and already collapses `NODATA` into `None`; `AGAIN`
//! has no first-class representation here because it only ever arises
//! inside a single blocking I/O call (a backend's `filter`/`update`), and a
//! thin wrapper retries it internally before any value crosses into this
//! algebra. So every combinator below is simply `impl Iterator`, composed
//! the way the standard library's own adapters are.

mod array;
mod chain;
mod chunkify;
mod constify;
mod tee;

pub use array::ArrayIter;
pub use chain::Chain;
pub use chunkify::{Chunk, Chunkify};
pub use constify::Constify;
pub use tee::{tee, TeeSide};
