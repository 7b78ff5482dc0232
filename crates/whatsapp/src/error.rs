/// Crate-wide result type for Graph API operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Webhook payload did not contain the expected structure.
    #[error("malformed webhook payload: {message}")]
    MalformedPayload { message: String },

    /// The Graph API answered with a non-success status.
    #[error("graph api returned {status} for {operation}")]
    ApiStatus {
        operation: &'static str,
        status: reqwest::StatusCode,
    },

    /// HTTP transport failure.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl Error {
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }
}
