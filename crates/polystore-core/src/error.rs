//! Error taxonomy for `polystore-core`.
//!
//! A single closed enum carries every failure the crate can produce.
//! Operators never wrap it in another error type before returning it to
//! the caller; see the crate-level concurrency and error-handling notes
//! in `concurrency.rs` for the surrounding contract.

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Result type alias used by every fallible function in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The closed error taxonomy operators surface to callers unchanged.
#[derive(Debug, Clone, ThisError, Serialize, Deserialize)]
pub enum Error {
    /// A requested key, table, row, or node does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// An index, offset, or row count fell outside the valid range.
    #[error("out of range: {0}")]
    OutOfRange(String),
    /// A value's runtime type did not match the column's declared type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// A row did not carry one value per column.
    #[error("arity mismatch: {0}")]
    ArityMismatch(String),
    /// A hash chain, checkpoint, or other self-describing structure failed
    /// its own consistency check.
    #[error("integrity check failed: {0}")]
    Integrity(String),
    /// The requested operation is outside this crate's scope.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// A caller-supplied argument was malformed in a way none of the more
    /// specific variants captures.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The operation is defined but not yet implemented.
    #[error("not implemented: {0}")]
    NotImplemented(String),
    /// The operation was cancelled by a caller-supplied cancellation token.
    #[error("cancelled: {0}")]
    Cancelled(String),
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(String),
    /// A hashing or proof-of-work check failed.
    #[error("crypto error: {0}")]
    Crypto(String),
    /// The target of a creation already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),
}

impl Error {
    /// Returns `true` if retrying the same operation could plausibly
    /// succeed (a transient condition), `false` if the caller must change
    /// something first.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::NotFound(_)
            | Self::OutOfRange(_)
            | Self::TypeMismatch(_)
            | Self::ArityMismatch(_)
            | Self::Integrity(_)
            | Self::Unsupported(_)
            | Self::InvalidInput(_)
            | Self::NotImplemented(_)
            | Self::AlreadyExists(_)
            | Self::Crypto(_) => false,
            Self::Cancelled(_) | Self::Io(_) => true,
        }
    }

    /// A short, stable category name suitable for metrics labels.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::OutOfRange(_) => "out_of_range",
            Self::TypeMismatch(_) => "type_mismatch",
            Self::ArityMismatch(_) => "arity_mismatch",
            Self::Integrity(_) => "integrity",
            Self::Unsupported(_) => "unsupported",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotImplemented(_) => "not_implemented",
            Self::Cancelled(_) => "cancelled",
            Self::Io(_) => "io",
            Self::Crypto(_) => "crypto",
            Self::AlreadyExists(_) => "already_exists",
        }
    }

    /// Logs this error at a level appropriate to its category.
    pub fn log(&self) {
        match self {
            Self::Integrity(_) | Self::Crypto(_) => tracing::error!(category = self.category(), "{self}"),
            Self::Cancelled(_) | Self::NotFound(_) => tracing::debug!(category = self.category(), "{self}"),
            _ => tracing::warn!(category = self.category(), "{self}"),
        }
    }

    /// Builds a [`Error::NotFound`].
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Builds a [`Error::OutOfRange`].
    pub fn out_of_range<S: Into<String>>(msg: S) -> Self {
        Self::OutOfRange(msg.into())
    }

    /// Builds a [`Error::TypeMismatch`].
    pub fn type_mismatch<S: Into<String>>(msg: S) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Builds a [`Error::ArityMismatch`].
    pub fn arity_mismatch<S: Into<String>>(msg: S) -> Self {
        Self::ArityMismatch(msg.into())
    }

    /// Builds a [`Error::Integrity`].
    pub fn integrity<S: Into<String>>(msg: S) -> Self {
        Self::Integrity(msg.into())
    }

    /// Builds a [`Error::Unsupported`].
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Builds a [`Error::InvalidInput`].
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Builds a [`Error::NotImplemented`].
    pub fn not_implemented<S: Into<String>>(msg: S) -> Self {
        Self::NotImplemented(msg.into())
    }

    /// Builds a [`Error::Cancelled`].
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Builds a [`Error::AlreadyExists`].
    pub fn already_exists<S: Into<String>>(msg: S) -> Self {
        Self::AlreadyExists(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Integrity(format!("checkpoint (de)serialization failed: {err}"))
    }
}
