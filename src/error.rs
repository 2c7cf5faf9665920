use thiserror::Error;
use std::path::PathBuf;

#[derive(Error, Debug)]
pub enum HashbankError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Truncated image: region at offset {offset} needs {needed} bytes, only {available} in stream")]
    TruncatedImage {
        offset: u64,
        needed: u64,
        available: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record encoding error: {0}")]
    Record(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] redb::Error),

    #[error("External tool failed: {tool}: {detail}")]
    ExternalTool { tool: String, detail: String },

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),

    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, HashbankError>;

// redb reports each operation through its own error type; funnel them all
// into the unified redb::Error so `?` works at call sites.
impl From<redb::DatabaseError> for HashbankError {
    fn from(e: redb::DatabaseError) -> Self {
        Self::Store(e.into())
    }
}

impl From<redb::TransactionError> for HashbankError {
    fn from(e: redb::TransactionError) -> Self {
        Self::Store(e.into())
    }
}

impl From<redb::TableError> for HashbankError {
    fn from(e: redb::TableError) -> Self {
        Self::Store(e.into())
    }
}

impl From<redb::StorageError> for HashbankError {
    fn from(e: redb::StorageError) -> Self {
        Self::Store(e.into())
    }
}

impl From<redb::CommitError> for HashbankError {
    fn from(e: redb::CommitError) -> Self {
        Self::Store(e.into())
    }
}
