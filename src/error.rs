use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitbookError {
    /// The caller passed something malformed or out of range. Fix the
    /// input and retry; nothing was written.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The ledger changed under the caller's feet (stale balance, stale
    /// watermark). Re-read and retry.
    #[error("Concurrent change: {0}")]
    Concurrency(String),

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, SplitbookError>;
