//! Common error types for ffgeo

use thiserror::Error;

/// Common result type for ffgeo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a pipeline run
///
/// Missing geographic data is never an error; it is represented by absence
/// in the output tables.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Run summary serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input tables do not match the expected upstream schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// Malformed upstream record (bad date, bad office code, ...)
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
