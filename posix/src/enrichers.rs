//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! Illustrative subclassing-backend enrichers, grounded on
//! `examples/original_source/src/backends/lustre/lustre.c`'s
//! `xattrs_get_fid`/`xattrs_get_hsm`/`xattrs_get_layout`. Concrete wire
//! calls into `liblustreapi` are out of scope; these enrichers
//! demonstrate the extension point's shape with deterministic, synthetic
//! values derived from the entry's own metadata rather than a real ioctl.

use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use rbh_core::data::{Pair, Value};
use rbh_core::error::Result;
use rbh_core::mem::ScratchStack;

use crate::walk::NsXattrsCallback;

/// Stands in for `xattrs_get_fid` + `xattrs_get_hsm` + the stripe/pattern/
/// pool/OST layout descriptors `fill_iterator_data` builds in `lustre.c`.
/// Every value here is synthesized from ordinary `stat(2)` fields since no
/// real Lustre client library is linked into this crate.
pub struct LustreEnricher;

impl NsXattrsCallback for LustreEnricher {
    fn ns_xattrs(&self, _path: &Path, meta: &Metadata, _scratch: &ScratchStack) -> Result<Vec<Pair>> {
        Ok(vec![
            Pair::new("fid", Some(Value::str(format!("0x{:x}", meta.ino())))),
            Pair::new("hsm_state", Some(Value::Uint32(0))),
            Pair::new("stripe_count", Some(Value::Uint32(1))),
            Pair::new("stripe_size", Some(Value::Uint32(1 << 20))),
            Pair::new("pool", Some(Value::str(""))),
            Pair::new(
                "ost",
                Some(Value::Sequence(vec![Value::Uint32(0)])),
            ),
        ])
    }
}

/// Stands in for an object-store backend's enricher: a bucket/key pair
/// and a synthetic object version, the object-store analogue of Lustre's
/// FID + layout.
pub struct ObjectStoreEnricher {
    pub bucket: Box<str>,
}

impl NsXattrsCallback for ObjectStoreEnricher {
    fn ns_xattrs(&self, path: &Path, meta: &Metadata, _scratch: &ScratchStack) -> Result<Vec<Pair>> {
        let key = path.to_string_lossy().into_owned();
        Ok(vec![
            Pair::new("bucket", Some(Value::str(self.bucket.as_ref()))),
            Pair::new("key", Some(Value::str(key))),
            Pair::new("version", Some(Value::Uint64(meta.mtime() as u64))),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lustre_enricher_always_reports_fid_and_hsm_state() {
        let dir = tempfile::tempdir().unwrap();
        let meta = std::fs::symlink_metadata(dir.path()).unwrap();
        let scratch = ScratchStack::default();
        let pairs = LustreEnricher.ns_xattrs(dir.path(), &meta, &scratch).unwrap();
        assert!(pairs.iter().any(|p| p.key.as_ref() == "fid"));
        assert!(pairs.iter().any(|p| p.key.as_ref() == "hsm_state"));
    }
}
