//! Error types shared by the ledger, its stores and the server configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the persistence layer. Any of these aborts the whole append or
/// update unit; nothing is partially committed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record could not be read back as a report.
    #[error("corrupt record file {path}: {details}")]
    Corrupt { path: PathBuf, details: String },

    /// A writer panicked while holding the ledger lock.
    #[error("ledger lock poisoned")]
    Poisoned,

    /// The backend refused the operation (transient).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by ledger and workflow operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A required field is missing or malformed. No record is created or changed.
    #[error("invalid `{field}`: {message}")]
    Validation { field: &'static str, message: String },

    #[error("report {id} not found")]
    NotFound { id: u64 },

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Illegal status transition or repeated feedback.
    #[error("report {id}: {message}")]
    State { id: u64, message: String },
}

impl LedgerError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        LedgerError::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn state(id: u64, message: impl Into<String>) -> Self {
        LedgerError::State {
            id,
            message: message.into(),
        }
    }
}

/// Invalid server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name}: cannot parse {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

pub type LedgerResult<T> = Result<T, LedgerError>;
