use boardpulse_ai::GenerationError;
use boardpulse_board::BoardApiError;
use boardpulse_storage::StorageError;

/// Errors surfaced by the report agent.
///
/// # Examples
///
/// ```rust
/// use boardpulse_server::agent::AgentError;
/// use boardpulse_storage::StorageError;
///
/// let err: AgentError = StorageError::NotFound { id: "r1".to_string() }.into();
/// assert!(matches!(err, AgentError::NotFound(id) if id == "r1"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("report agent is already running")]
    AlreadyRunning,

    #[error("report agent is not running")]
    NotRunning,

    /// Board API call failed.
    #[error(transparent)]
    RemoteApi(#[from] BoardApiError),

    /// Narrative generation failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Report store I/O or parse failure.
    #[error(transparent)]
    Storage(StorageError),

    #[error("report not found: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<StorageError> for AgentError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id } => AgentError::NotFound(id),
            other => AgentError::Storage(other),
        }
    }
}
