//! Unified error types for the inventory backend.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants carry enough
//! context to build a user-facing message, and [`Error::kind`] collapses them into the
//! coarse categories a boundary layer maps to response statuses.

use crate::{cache::CacheError, notification::NotificationError};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Required input was missing or blank
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// No computer row exists with the given identifier
    #[error("No computer found with ID: {id}")]
    ComputerNotFound { id: i64 },

    /// No employee row exists with the given abbreviation
    #[error("Employee not found with abbreviation {abbreviation}")]
    EmployeeNotFound { abbreviation: String },

    /// The employee does not own the computer
    #[error("Computer {computer_id} is not assigned to employee {abbreviation}")]
    LinkNotFound {
        computer_id: i64,
        abbreviation: String,
    },

    /// A unique constraint (MAC address, email, abbreviation, ownership link) was violated
    #[error("Duplicate key: {message}")]
    DuplicateKey { message: String },

    /// A cached payload could not be deserialized
    #[error("Error decoding cached data for key {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialized for caching
    #[error("Error encoding data for cache: {0}")]
    Encode(serde_json::Error),

    /// The cache backend failed under a policy that does not ignore it
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// The administrator notification could not be delivered
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Any other store failure
    #[error("Database error: {0}")]
    Database(DbErr),

    /// Settings are unreadable or invalid
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Coarse error categories, one per failure class a caller has to distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input from the caller
    Validation,
    /// A computer, employee, or ownership link does not exist
    NotFound,
    /// A unique value is already taken
    DuplicateKey,
    /// Cached bytes did not round-trip through JSON
    Decode,
    /// The administrator could not be notified
    Notification,
    /// The cache backend failed
    Cache,
    /// The store failed
    Store,
    /// Settings could not be loaded
    Config,
}

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::ComputerNotFound { .. }
            | Self::EmployeeNotFound { .. }
            | Self::LinkNotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Self::Decode { .. } | Self::Encode(_) => ErrorKind::Decode,
            Self::Cache(_) => ErrorKind::Cache,
            Self::Notification(_) => ErrorKind::Notification,
            Self::Database(_) => ErrorKind::Store,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Shorthand for `self.kind() == ErrorKind::NotFound`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::DuplicateKey { message },
            _ => Self::Database(err),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
