/// Errors that can occur while asking a language model for text.
///
/// # Examples
///
/// ```rust
/// use boardpulse_ai::error::GenerationError;
///
/// let err = GenerationError::UnsupportedProvider("llamafile".to_string());
/// assert!(err.to_string().contains("llamafile"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Non-2xx status from the chat-completions endpoint.
    #[error("{provider} API HTTP error: status={status}, body={body}")]
    HttpError {
        provider: String,
        status: u16,
        body: String,
    },

    /// Transport failure from `reqwest`.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Response body was not a valid chat-completions payload.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The model answered with zero choices.
    #[error("Empty response from {provider} API")]
    EmptyResponse { provider: String },

    #[error("Unsupported AI provider: {0}")]
    UnsupportedProvider(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
