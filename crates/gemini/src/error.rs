/// Crate-wide result type for Gemini API operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API answered with a non-success status.
    #[error("gemini api returned {status} for {operation}")]
    ApiStatus {
        operation: &'static str,
        status: reqwest::StatusCode,
    },

    /// The response parsed but carried no usable candidate text.
    #[error("gemini response contained no candidate text")]
    EmptyResponse,

    /// HTTP transport failure.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
