/// Errors returned by the board data client.
///
/// # Examples
///
/// ```rust
/// use boardpulse_board::error::BoardApiError;
///
/// let err = BoardApiError::HttpError { status: 401, body: "invalid token".to_string() };
/// assert!(err.to_string().contains("401"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum BoardApiError {
    /// Non-2xx status from the board API.
    #[error("Trello API HTTP error: status={status}, body={body}")]
    HttpError { status: u16, body: String },

    /// Transport failure from `reqwest`.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("Failed to decode {resource} response: {source}")]
    DecodeError {
        resource: &'static str,
        source: serde_json::Error,
    },

    /// HMAC signing failed.
    #[error("OAuth signing error: {0}")]
    SigningError(String),
}

pub type Result<T> = std::result::Result<T, BoardApiError>;
