//! Error types for HTML-to-slide conversion.
//!
//! Only failures nothing can substitute for end up here. Unparseable style
//! values resolve to defaults inside the parsers and unresolvable assets are
//! skipped with a warning, so neither ever surfaces as an [`Error`].

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// The rendering engine could not load the document, or the
    /// presentation encoder could not be constructed.
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// The presentation encoder rejected a draw call or failed to serialize.
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// Invalid configuration value or file.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failed to read input or write output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
