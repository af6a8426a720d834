use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImageGenError>;

/// Image generation pipeline errors
#[derive(Debug, Error)]
pub enum ImageGenError {
    /// Request parameters failed validation; no network call was made
    #[error("invalid request: {0}")]
    Validation(String),

    /// The inference API rejected the configured bearer token
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// The inference API returned a non-200, non-401 response
    #[error("inference API error ({status}): {body}")]
    RemoteFailure { status: u16, body: String },

    /// Network or decoding fault; the caller may retry
    #[error("transient error: {0}")]
    Transient(String),

    /// File read or write fault
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImageGenError {
    /// Whether a caller could reasonably retry the operation
    ///
    /// This client never retries on its own; the classification is
    /// informational for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Machine-readable error kind for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Unauthorized(_) => "unauthorized",
            Self::RemoteFailure { .. } => "remote_failure",
            Self::Transient(_) => "transient",
            Self::Io(_) => "io",
        }
    }
}
