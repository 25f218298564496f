use thiserror::Error;

/// Top-level error type for the Palaver client.
///
/// Only setup paths (configuration, HTTP client construction, I/O) surface
/// errors. The conversation pipeline itself recovers every failure into an
/// advisory reply, so these never reach the renderer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PalaverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for PalaverError {
    fn from(err: toml::de::Error) -> Self {
        PalaverError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for PalaverError {
    fn from(err: toml::ser::Error) -> Self {
        PalaverError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PalaverError {
    fn from(err: serde_json::Error) -> Self {
        PalaverError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Palaver setup operations.
pub type Result<T> = std::result::Result<T, PalaverError>;
