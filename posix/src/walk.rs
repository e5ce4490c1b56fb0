//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The POSIX tree-walking source backend: a pre-order,
//! one-entry-at-a-time filesystem walk producing an [`Fsentry`] per visited
//! node. Subclassing backends register a [`NsXattrsCallback`] to append
//! backend-specific xattrs per entry.

use std::fs::{self, Metadata};
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::{Path, PathBuf};

use rbh_core::data::Pair;
use rbh_core::error::{Error, Result};
use rbh_core::fsentry::{EntryId, Fsentry};
use rbh_core::mem::ScratchStack;
use rbh_core::statx::{FileType, Statx};

/// Appends backend-specific xattrs for one visited entry:
/// file identifiers, HSM state, layout descriptors and the like.
/// Implementations must push every byte they reference into `scratch`;
/// the enriched `Fsentry` is only valid until the walker advances past
/// it — in this safe-Rust rendition that means the
/// returned `Pair`s must not borrow past the current `next()` call, which
/// owning `Box<str>`/`Box<[u8]>` payloads (as [`Pair`] already requires)
/// guarantees without needing the scratch stack's lifetime at all. It's
/// threaded through regardless so an enricher that wants cheap bump
/// allocation for scratch computation has somewhere to put it.
pub trait NsXattrsCallback {
    fn ns_xattrs(&self, path: &Path, meta: &Metadata, scratch: &ScratchStack) -> Result<Vec<Pair>>;
}

/// The callback a plain POSIX source (no subclassing backend) registers:
/// adds nothing.
pub struct NoEnrichment;

impl NsXattrsCallback for NoEnrichment {
    fn ns_xattrs(&self, _path: &Path, _meta: &Metadata, _scratch: &ScratchStack) -> Result<Vec<Pair>> {
        Ok(Vec::new())
    }
}

fn entry_id(meta: &Metadata) -> EntryId {
    let mut bytes = Vec::with_capacity(16);
    bytes.extend_from_slice(&meta.dev().to_be_bytes());
    bytes.extend_from_slice(&meta.ino().to_be_bytes());
    EntryId::new(bytes)
}

/// `gnu_dev_major`/`gnu_dev_minor`'s bit layout, the same one
/// `original_source/include/robinhood/statx.h`'s `major`/`minor` macros
/// rely on via glibc.
fn dev_major(dev: u64) -> u32 {
    (((dev >> 8) & 0xfff) | ((dev >> 32) & !0xfff)) as u32
}

fn dev_minor(dev: u64) -> u32 {
    ((dev & 0xff) | ((dev >> 12) & !0xff)) as u32
}

fn file_type_of(meta: &Metadata) -> FileType {
    let ft = meta.file_type();
    if ft.is_dir() {
        FileType::Directory
    } else if ft.is_symlink() {
        FileType::Symlink
    } else if ft.is_block_device() {
        FileType::BlockDevice
    } else if ft.is_char_device() {
        FileType::CharDevice
    } else if ft.is_fifo() {
        FileType::Fifo
    } else if ft.is_socket() {
        FileType::Socket
    } else {
        FileType::Regular
    }
}

fn statx_from_metadata(meta: &Metadata) -> Statx {
    Statx {
        r#type: Some(file_type_of(meta)),
        mode: Some((meta.mode() & 0o7777) as u16),
        nlink: Some(meta.nlink() as u32),
        uid: Some(meta.uid()),
        gid: Some(meta.gid()),
        ino: Some(meta.ino()),
        size: Some(meta.size()),
        blocks: Some(meta.blocks()),
        blksize: Some(meta.blksize() as u32),
        attributes: None,
        atime_sec: Some(meta.atime()),
        atime_nsec: Some(meta.atime_nsec() as u32),
        btime_sec: None,
        btime_nsec: None,
        ctime_sec: Some(meta.ctime()),
        ctime_nsec: Some(meta.ctime_nsec() as u32),
        mtime_sec: Some(meta.mtime()),
        mtime_nsec: Some(meta.mtime_nsec() as u32),
        rdev_major: Some(dev_major(meta.rdev())),
        rdev_minor: Some(dev_minor(meta.rdev())),
        dev_major: Some(dev_major(meta.dev())),
        dev_minor: Some(dev_minor(meta.dev())),
    }
}

/// A pre-order, single-threaded walk of a POSIX directory tree, yielding
/// one [`Fsentry`] per visited node.
pub struct PosixIter<'a> {
    root: PathBuf,
    stack: Vec<PathBuf>,
    enricher: &'a dyn NsXattrsCallback,
    scratch: ScratchStack,
}

impl<'a> PosixIter<'a> {
    pub fn new(root: impl Into<PathBuf>, enricher: &'a dyn NsXattrsCallback) -> Result<Self> {
        let root = root.into();
        fs::symlink_metadata(&root).map_err(|e| Error::backend(e.to_string()))?;
        Ok(Self {
            stack: vec![root.clone()],
            root,
            enricher,
            scratch: ScratchStack::default(),
        })
    }

    fn build_entry(&self, path: &Path, meta: &Metadata) -> Result<Fsentry> {
        let is_root = path == self.root;
        let (parent_id, name) = if is_root {
            (EntryId::root(), None)
        } else {
            let parent_meta = fs::symlink_metadata(path.parent().expect("non-root has a parent"))
                .map_err(|e| Error::backend(e.to_string()))?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| Error::inval("non-UTF-8 file name"))?;
            (entry_id(&parent_meta), Some(name.into()))
        };

        let symlink = if meta.file_type().is_symlink() {
            fs::read_link(path)
                .ok()
                .and_then(|p| p.to_str().map(|s| s.into()))
        } else {
            None
        };

        let ns_xattrs = self.enricher.ns_xattrs(path, meta, &self.scratch)?;

        Fsentry::new(
            entry_id(meta),
            parent_id,
            name,
            statx_from_metadata(meta),
            ns_xattrs,
            Vec::new(),
            symlink,
        )
    }
}

impl<'a> Iterator for PosixIter<'a> {
    type Item = Result<Fsentry>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.stack.pop()?;
        let meta = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) => return Some(Err(Error::backend(e.to_string()))),
        };

        if meta.is_dir() {
            match fs::read_dir(&path) {
                Ok(rd) => {
                    let mut children: Vec<PathBuf> =
                        rd.filter_map(|e| e.ok().map(|e| e.path())).collect();
                    // Sort then push in reverse so `pop()` visits children
                    // in a stable, name-ascending order.
                    children.sort();
                    children.reverse();
                    self.stack.extend(children);
                }
                Err(e) => return Some(Err(Error::backend(e.to_string()))),
            }
        }

        Some(self.build_entry(&path, &meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_a_small_tree_pre_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::write(dir.path().join("a/c"), b"hi").unwrap();
        std::fs::write(dir.path().join("b"), b"hi").unwrap();

        let it = PosixIter::new(dir.path(), &NoEnrichment).unwrap();
        let names: Vec<Option<String>> = it
            .map(|r| r.unwrap().name.map(|n| n.to_string()))
            .collect();
        assert_eq!(
            names,
            vec![None, Some("a".to_string()), Some("c".to_string()), Some("b".to_string())]
        );
    }

    #[test]
    fn root_entry_has_no_name_and_empty_parent() {
        let dir = tempfile::tempdir().unwrap();
        let mut it = PosixIter::new(dir.path(), &NoEnrichment).unwrap();
        let root = it.next().unwrap().unwrap();
        assert!(root.is_root());
        assert!(root.name.is_none());
    }
}
