//! Unified error type for pixprompt.

use thiserror::Error;

/// Errors that can occur while generating or handling images.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No credential was supplied; raised before any external call.
    #[error("Missing API key. Pass --api-key, set GEMINI_API_KEY, or add it to the config file.")]
    MissingCredential,

    /// An API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code (0 for replayed or synthesized errors).
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A returned payload could not be decoded into an image.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// An image could not be re-encoded for output.
    #[error("Image encode error: {0}")]
    ImageEncode(String),

    /// Cassette record/replay error.
    #[error("Cassette error: {0}")]
    Cassette(String),
}
