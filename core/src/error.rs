//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! Error taxonomy shared by every component in this crate.

/// The error taxonomy every low-level routine, iterator and backend call in
/// this workspace propagates.
///
/// Unlike `skyd`'s internal `DatabaseError`/`LexError` enums (which stay
/// process-local because `skyd` is a binary), this type implements the
/// standard error traits: this crate is a library, and callers need to `?`
/// through it and box it into `dyn Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed argument or a schema/invariant violation.
    #[error("invalid argument: {0}")]
    Inval(String),
    /// The requested entry does not exist.
    #[error("no such entry")]
    NoEnt,
    /// The iterator is exhausted. Terminal, not an error, to callers of
    /// high-level wrappers (`Iterator::next` returning `None`).
    #[error("no more data")]
    NoData,
    /// Transient failure; the caller (or a library-provided retry wrapper)
    /// should retry.
    #[error("temporary failure, retry")]
    Again,
    /// A bounded buffer (scratch stack, hashmap, value/filter clone) is
    /// exhausted.
    #[error("insufficient buffer space")]
    NoBufs,
    /// The backend does not support the requested feature.
    #[error("operation not supported: {0}")]
    NotSup(String),
    /// An opaque error surfaced by a remote backend.
    #[error("backend error: {0}")]
    BackendError(String),
    /// Allocation failure.
    #[error("out of memory")]
    NoMem,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn inval(msg: impl Into<String>) -> Self {
        Self::Inval(msg.into())
    }

    pub fn notsup(msg: impl Into<String>) -> Self {
        Self::NotSup(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::BackendError(msg.into())
    }

    /// True for [`Error::Again`] — the one variant a retry loop should not
    /// surface to a final caller.
    pub fn is_again(&self) -> bool {
        matches!(self, Self::Again)
    }
}

impl From<&Error> for String {
    fn from(e: &Error) -> Self {
        format!("{e}")
    }
}
