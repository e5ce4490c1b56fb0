//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The wire seam to an actual MongoDB deployment. Concrete wire calls to
//! MongoDB are treated as an external collaborator, specified only at its
//! interface, the same way `examples/original_source` isolates every
//! `mongoc_*`/`bson_*` call behind `mongo.c`'s static helpers. This crate
//! ships the seam and [`crate::memstore::MemStore`], a
//! semantically complete in-memory stand-in exercised by this crate's own
//! tests; an embedder wanting a live cluster implements [`MongoDriver`]
//! against the `mongodb`/`bson` crates the way `mongo.c` wraps `libmongoc`.

use crate::schema::Document;
use rbh_core::Result;

/// One write issued as part of an `update` batch, mirroring the
/// `mongoc_bulk_operation_update_one`/`_remove_one` shape
/// `mongo_bulk_append_fsevent` builds up (`mongo.c`). Selector/update are
/// left as opaque query-language strings here since no BSON codec is in
/// scope; a real driver would instead accept `bson::Document`s.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    UpdateOne {
        selector: String,
        update: String,
        upsert: bool,
    },
    RemoveOne {
        selector: String,
    },
}

/// A connection to a MongoDB collection capable of running an aggregation
/// pipeline and executing a bulk write. No implementation ships in this
/// crate; see the module doc.
pub trait MongoDriver {
    fn find(&self, pipeline: &str) -> Result<Vec<Document>>;
    fn bulk_write(&self, ops: &[WriteOp]) -> Result<u64>;
}
