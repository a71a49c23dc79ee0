use thiserror::Error;

/// Common error type for d21s components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("API client unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias using d21s's Error.
pub type Result<T> = std::result::Result<T, Error>;
