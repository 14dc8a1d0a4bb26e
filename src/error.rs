//! Error types for image editing.

/// Errors that can occur while editing an image.
#[derive(Debug, thiserror::Error)]
pub enum RetouchError {
    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Error body text, preserved verbatim.
        message: String,
    },

    /// Content was blocked by the service's safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A data URL did not match `data:<type>;base64,<payload>`.
    #[error("Invalid data URL format")]
    InvalidDataUrl,

    /// The service response carried no inline image data.
    #[error("no image data in response")]
    NoImageInResponse,

    /// Failed to decode base64 image data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (e.g., reading the input or saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for editing operations.
pub type Result<T> = std::result::Result<T, RetouchError>;
