use std::path::PathBuf;

/// Errors that can occur within the report store.
///
/// # Examples
///
/// ```rust
/// use boardpulse_storage::error::StorageError;
///
/// let err = StorageError::NotFound { id: "b1_weekly_2024-03-04".to_string() };
/// assert!(err.to_string().contains("b1_weekly_2024-03-04"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No stored report matches the requested id.
    #[error("Storage: report not found (id={id})")]
    NotFound { id: String },

    /// Filesystem failure on a specific path.
    #[error("Storage: I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A report file exists but does not hold a valid report.
    #[error("Storage: invalid report file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Serialization of a report failed.
    #[error("Storage: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A name component that would escape the storage directory.
    #[error("Storage: invalid key '{0}'")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;
