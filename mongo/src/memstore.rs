//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! An in-memory reference sink backend: implements the [`Backend`] contract
//! and the same update/filter translation rules a real MongoDB sink would
//! need, without any wire protocol. This is what this crate's own tests
//! exercise (scenario S6, testable property 7).

use std::cell::RefCell;
use std::collections::HashMap;

use rbh_core::backend::{Backend, FilterOptions};
use rbh_core::data::Pair;
use rbh_core::error::{Error, Result};
use rbh_core::filter::{Field, Filter};
use rbh_core::fsentry::{EntryId, Fsentry};
use rbh_core::fsevent::{Fsevent, Namespace, XattrDelta};

use crate::schema::{Document, NsEntry};

/// A store's root is the one document reachable by no `ns` entry. We track
/// it by id rather than re-deriving "has zero ns entries" on every query,
/// since a document can transiently have zero `ns` entries right after an
/// `Upsert` and before its first `Link`.
pub struct MemStore {
    root_id: EntryId,
    documents: RefCell<HashMap<EntryId, Document>>,
}

impl MemStore {
    /// Creates a fresh store whose root document already exists: every
    /// store has exactly one entry whose `parent_id` is empty.
    pub fn new(root_id: EntryId) -> Self {
        let mut documents = HashMap::new();
        documents.insert(root_id.clone(), Document::new_empty(root_id.clone()));
        Self {
            root_id,
            documents: RefCell::new(documents),
        }
    }

    fn get_or_create<'a>(
        documents: &'a mut HashMap<EntryId, Document>,
        id: &EntryId,
    ) -> &'a mut Document {
        documents
            .entry(id.clone())
            .or_insert_with(|| Document::new_empty(id.clone()))
    }

    /// Applies the xattr portion of an `Upsert`/`Xattr` event. The wire
    /// shape splits `xattrs` into `inode` and `namespace`
    /// sub-deltas but does not pin the namespace delta to one particular
    /// `ns` entry when the event itself carries no `ns` field (only `Link`/
    /// `Unlink` do); this reference implementation broadcasts the
    /// namespace-xattr delta to every `ns` entry currently on the document,
    /// which is a no-op on the common case of a delta arriving before the
    /// entry's first `Link`.
    fn apply_xattr_delta(doc: &mut Document, delta: &XattrDelta) {
        apply_pairs(&mut doc.inode_xattrs, &delta.inode_xattrs);
        for ns in &mut doc.ns {
            apply_pairs(&mut ns.xattrs, &delta.ns_xattrs);
        }
    }

    fn apply_event(&self, event: Fsevent) -> Result<()> {
        let mut documents = self.documents.borrow_mut();
        match event {
            Fsevent::Upsert { id, stat, xattrs } => {
                let doc = Self::get_or_create(&mut documents, &id);
                if let Some(stat) = stat {
                    doc.stat = stat;
                }
                if let Some(delta) = xattrs {
                    Self::apply_xattr_delta(doc, &delta);
                }
                Ok(())
            }
            Fsevent::Link { id, ns } => {
                unlink_everywhere(&mut documents, &ns);
                let doc = Self::get_or_create(&mut documents, &id);
                doc.ns.push(NsEntry {
                    parent_id: ns.parent_id,
                    name: ns.name,
                    xattrs: Vec::new(),
                });
                Ok(())
            }
            Fsevent::Unlink { id, ns } => {
                let doc = documents.get_mut(&id).ok_or(Error::NoEnt)?;
                let idx = doc
                    .find_ns(&ns.parent_id, &ns.name)
                    .ok_or(Error::NoEnt)?;
                doc.ns.remove(idx);
                if doc.ns.is_empty() {
                    documents.remove(&id);
                }
                Ok(())
            }
            Fsevent::Delete { id } => {
                documents.remove(&id);
                Ok(())
            }
            Fsevent::Xattr { id, delta } => {
                let doc = documents.get_mut(&id).ok_or(Error::NoEnt)?;
                Self::apply_xattr_delta(doc, &delta);
                Ok(())
            }
        }
    }

    fn to_fsentries(&self, doc: &Document) -> Vec<Fsentry> {
        let mut out = Vec::new();
        if doc.id == self.root_id {
            out.push(
                Fsentry::new(
                    doc.id.clone(),
                    EntryId::root(),
                    None,
                    doc.stat.clone(),
                    Vec::new(),
                    doc.inode_xattrs.clone(),
                    doc.symlink.clone(),
                )
                .expect("root fsentry is always well-formed"),
            );
        }
        for ns in &doc.ns {
            if let Ok(e) = Fsentry::new(
                doc.id.clone(),
                ns.parent_id.clone(),
                Some(ns.name.clone()),
                doc.stat.clone(),
                ns.xattrs.clone(),
                doc.inode_xattrs.clone(),
                doc.symlink.clone(),
            ) {
                out.push(e);
            }
        }
        out
    }
}

fn apply_pairs(target: &mut Vec<Pair>, delta: &[Pair]) {
    for pair in delta {
        target.retain(|p| p.key != pair.key);
        if !pair.is_unset() {
            target.push(pair.clone());
        }
    }
}

fn unlink_everywhere(documents: &mut HashMap<EntryId, Document>, ns: &Namespace) {
    let mut emptied = Vec::new();
    for (id, doc) in documents.iter_mut() {
        if let Some(idx) = doc.find_ns(&ns.parent_id, &ns.name) {
            doc.ns.remove(idx);
            if doc.ns.is_empty() {
                emptied.push(id.clone());
            }
        }
    }
    for id in emptied {
        documents.remove(&id);
    }
}

impl Backend for MemStore {
    fn root(&self, _projection: Option<&[Field]>) -> Result<Fsentry> {
        let documents = self.documents.borrow();
        let doc = documents.get(&self.root_id).ok_or(Error::NoEnt)?;
        self.to_fsentries(doc)
            .into_iter()
            .find(Fsentry::is_root)
            .ok_or(Error::NoEnt)
    }

    fn branch(&self, id: &EntryId) -> Result<Box<dyn Backend + '_>> {
        let documents = self.documents.borrow();
        if !documents.contains_key(id) {
            return Err(Error::NoEnt);
        }
        Ok(Box::new(MemStoreBranch {
            store: self,
            root_id: id.clone(),
        }))
    }

    fn filter(
        &self,
        filter: &Filter,
        options: &FilterOptions,
    ) -> Result<Box<dyn Iterator<Item = Result<Fsentry>> + '_>> {
        options.require_supported(true, true, false, false)?;
        let documents = self.documents.borrow();
        let mut matches: Vec<Fsentry> = documents
            .values()
            .flat_map(|doc| self.to_fsentries(doc))
            .filter(|e| filter.evaluate(e))
            .collect();
        let skip = options.skip as usize;
        if skip > 0 {
            matches.drain(..skip.min(matches.len()));
        }
        if let Some(limit) = options.limit {
            matches.truncate(limit as usize);
        }
        Ok(Box::new(matches.into_iter().map(Ok)))
    }

    fn update(&self, events: &mut dyn Iterator<Item = Fsevent>) -> Result<u64> {
        let mut count = 0u64;
        for event in events {
            log::debug!("mongo memstore: applying {event:?}");
            self.apply_event(event)?;
            count += 1;
        }
        Ok(count)
    }
}

/// A branch view: shares `store`'s documents but restricts
/// `root`/`filter` to the subtree under `root_id`. Closing (dropping) the
/// parent `MemStore` does not affect an outstanding branch's borrow
/// because `&self` already ties the branch's lifetime to it.
struct MemStoreBranch<'a> {
    store: &'a MemStore,
    root_id: EntryId,
}

impl<'a> Backend for MemStoreBranch<'a> {
    fn root(&self, projection: Option<&[Field]>) -> Result<Fsentry> {
        let documents = self.store.documents.borrow();
        let doc = documents.get(&self.root_id).ok_or(Error::NoEnt)?;
        let _ = projection;
        self.store
            .to_fsentries(doc)
            .into_iter()
            .next()
            .ok_or(Error::NoEnt)
    }

    fn branch(&self, id: &EntryId) -> Result<Box<dyn Backend + '_>> {
        self.store.branch(id)
    }

    fn filter(
        &self,
        filter: &Filter,
        options: &FilterOptions,
    ) -> Result<Box<dyn Iterator<Item = Result<Fsentry>> + '_>> {
        self.store.filter(filter, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbh_core::filter::Operator;
    use rbh_core::statx::{FileType, Statx};

    fn store() -> MemStore {
        MemStore::new(EntryId::new(*b"root"))
    }

    #[test]
    fn s6_fsevent_stream_leaves_no_trace_of_x() {
        let store = store();
        let x = EntryId::new(*b"X");
        let root = EntryId::new(*b"root");

        let events = vec![
            Fsevent::Upsert {
                id: x.clone(),
                stat: Some(Statx {
                    r#type: Some(FileType::Regular),
                    ..Default::default()
                }),
                xattrs: None,
            },
            Fsevent::Link {
                id: x.clone(),
                ns: Namespace {
                    parent_id: root.clone(),
                    name: "f".into(),
                },
            },
            Fsevent::Unlink {
                id: x.clone(),
                ns: Namespace {
                    parent_id: root.clone(),
                    name: "f".into(),
                },
            },
            Fsevent::Delete { id: x.clone() },
        ];
        let applied = store.update(&mut events.into_iter()).unwrap();
        assert_eq!(applied, 4);

        let f = Filter::compare(Field::Id, Operator::Eq, rbh_core::data::Value::bin(x.as_bytes()))
            .unwrap();
        let mut it = store.filter(&f, &FilterOptions::all()).unwrap();
        assert!(it.next().is_none());
    }

    #[test]
    fn link_replaces_any_existing_same_name_entry() {
        let store = store();
        let root = EntryId::new(*b"root");
        let a = EntryId::new(*b"a");
        let b = EntryId::new(*b"b");

        let mut events = vec![
            Fsevent::Upsert {
                id: a.clone(),
                stat: Some(Statx::default()),
                xattrs: None,
            },
            Fsevent::Link {
                id: a.clone(),
                ns: Namespace {
                    parent_id: root.clone(),
                    name: "f".into(),
                },
            },
            Fsevent::Upsert {
                id: b.clone(),
                stat: Some(Statx::default()),
                xattrs: None,
            },
            Fsevent::Link {
                id: b.clone(),
                ns: Namespace {
                    parent_id: root.clone(),
                    name: "f".into(),
                },
            },
        ]
        .into_iter();
        store.update(&mut events).unwrap();

        let f = Filter::compare(
            Field::ParentId,
            Operator::Eq,
            rbh_core::data::Value::bin(root.as_bytes()),
        )
        .unwrap();
        let results: Vec<Fsentry> = store
            .filter(&f, &FilterOptions::all())
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id.as_bytes(), b.as_bytes());
    }

    #[test]
    fn property7_full_upsert_replay_is_idempotent() {
        let store = store();
        let a = EntryId::new(*b"a");
        let stat = Statx {
            r#type: Some(FileType::Regular),
            size: Some(42),
            ..Default::default()
        };
        let event = || Fsevent::Upsert {
            id: a.clone(),
            stat: Some(stat.clone()),
            xattrs: None,
        };
        store.update(&mut vec![event()].into_iter()).unwrap();
        store.update(&mut vec![event()].into_iter()).unwrap();

        let documents = store.documents.borrow();
        assert_eq!(documents.get(&a).unwrap().stat, stat);
    }

    /// A random walk of Upsert/Link/Unlink/Delete on a handful of ids must
    /// never leave a non-root document with an empty `ns` array sitting
    /// around (the rule `Unlink` enforces) no matter the order events
    /// arrive in.
    #[test]
    fn random_event_stream_never_leaves_an_empty_ns_document() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let store = store();
        let root = EntryId::new(*b"root");
        let ids: Vec<EntryId> = (0u8..6).map(|i| EntryId::new([b'n', i])).collect();
        let names = ["f0", "f1", "f2"];
        let mut rng = StdRng::seed_from_u64(0x5EED_C0DE);
        let mut linked: std::collections::HashSet<(usize, &str)> = Default::default();

        for _ in 0..3000 {
            let i = rng.gen_range(0..ids.len());
            let id = ids[i].clone();
            match rng.gen_range(0..4) {
                0 => {
                    store
                        .apply_event(Fsevent::Upsert {
                            id,
                            stat: Some(Statx::default()),
                            xattrs: None,
                        })
                        .unwrap();
                }
                1 => {
                    let name = names[rng.gen_range(0..names.len())];
                    let _ = store.apply_event(Fsevent::Link {
                        id,
                        ns: Namespace { parent_id: root.clone(), name: name.into() },
                    });
                    linked.insert((i, name));
                }
                2 => {
                    let name = names[rng.gen_range(0..names.len())];
                    if linked.remove(&(i, name)) {
                        store
                            .apply_event(Fsevent::Unlink {
                                id,
                                ns: Namespace { parent_id: root.clone(), name: name.into() },
                            })
                            .unwrap();
                    }
                }
                _ => {
                    let _ = store.apply_event(Fsevent::Delete { id: id.clone() });
                    linked.retain(|(j, _)| *j != i);
                }
            }
        }

        let documents = store.documents.borrow();
        for (id, doc) in documents.iter() {
            if *id != root {
                assert!(!doc.ns.is_empty(), "document {id:?} survived with no ns entries");
            }
        }
    }
}
