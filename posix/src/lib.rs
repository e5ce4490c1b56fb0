//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The POSIX source backend: a pre-order filesystem
//! tree-walker producing an `Fsentry` per visited node, plus the
//! xattr-enricher extension point subclassing backends (Lustre,
//! object-store) register against.

mod enrichers;
mod walk;

pub use enrichers::{LustreEnricher, ObjectStoreEnricher};
pub use walk::{NoEnrichment, NsXattrsCallback, PosixIter};
