//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! The backend contract: a capability set `{root, branch,
//! filter, update, destroy}`. The original's manually-managed operation
//! tables become, in a modern systems language, a capability set composed
//! of branches as decorators — a trait is exactly that capability set, and
//! `destroy` is simply `Drop`.

use crate::error::{Error, Result};
use crate::filter::{Field, Filter};
use crate::fsentry::Fsentry;
use crate::fsevent::Fsevent;

/// Sort direction for a [`FilterOptions`] sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A closed-enum bundle of `filter` options. Any option a
/// backend can't honor must fail the call with [`Error::NotSup`] rather
/// than silently ignoring it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub skip: u64,
    pub limit: Option<u64>,
    pub sort: Vec<(Field, SortDirection)>,
    /// `None` projects every field; `Some` restricts the result to the
    /// named fields (the schema's dotted paths).
    pub projection: Option<Vec<Field>>,
}

impl FilterOptions {
    pub fn all() -> Self {
        Self::default()
    }

    /// Backends that don't implement `skip`/`limit`/`sort`/`projection`
    /// call this first and propagate the error it returns; it validates
    /// nothing about the filter itself, only the shape of the options a
    /// backend is about to be asked to honor.
    pub fn require_supported(
        &self,
        skip: bool,
        limit: bool,
        sort: bool,
        projection: bool,
    ) -> Result<()> {
        if !skip && self.skip != 0 {
            return Err(Error::notsup("backend does not support skip"));
        }
        if !limit && self.limit.is_some() {
            return Err(Error::notsup("backend does not support limit"));
        }
        if !sort && !self.sort.is_empty() {
            return Err(Error::notsup("backend does not support sort"));
        }
        if !projection && self.projection.is_some() {
            return Err(Error::notsup("backend does not support projection"));
        }
        Ok(())
    }
}

/// A polymorphic component that produces [`Fsentry`]s, consumes
/// [`Fsevent`]s, or both. Implementations may
/// implement only the methods their role needs; the default bodies fail
/// with `NOTSUP` so a pure source backend need not stub out `update`.
///
/// State machine: `Open -> Closed` via `Drop`; there is no other
/// transition. A branch obtained from [`Backend::branch`] may outlive or
/// outlast its parent going out of scope: closing the parent must not
/// close outstanding branches, so ownership of any shared connection
/// resource is the implementation's concern (e.g. an `Arc`).
pub trait Backend {
    /// The entry whose `parent_id` is empty, projected to the
    /// requested fields.
    fn root(&self, projection: Option<&[Field]>) -> Result<Fsentry>;

    /// A view scoped to the subtree rooted at `id`. The
    /// returned type is backend-specific so it can share connection state;
    /// boxed behind the trait object for callers that just need `Backend`.
    fn branch(&self, id: &crate::fsentry::EntryId) -> Result<Box<dyn Backend + '_>>;

    /// Yields matching entries. A mutable iterator: yielded
    /// entries are transferred to the caller.
    fn filter(
        &self,
        filter: &Filter,
        options: &FilterOptions,
    ) -> Result<Box<dyn Iterator<Item = Result<Fsentry>> + '_>>;

    /// Applies `events` as a batch, returning the number consumed before
    /// the first unrecoverable error. Already-applied
    /// events are not rolled back.
    fn update(&self, events: &mut dyn Iterator<Item = Fsevent>) -> Result<u64> {
        let _ = events;
        Err(Error::notsup("backend is read-only"))
    }
}
