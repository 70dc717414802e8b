use thiserror::Error;

/// Main error type for sparqlbench
#[derive(Error, Debug)]
pub enum BenchError {
    /// Response cache (SQLite) errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Questions file could not be parsed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Questions file violates one of its invariants
    #[error("Validation error: {0}")]
    Validation(String),

    /// Endpoint could not be reached or answered with an error
    #[error("Endpoint error: {0}")]
    Endpoint(String),

    /// A predicted qname has no ground-truth counterpart
    #[error("No ground truth for {0}")]
    MissingGroundTruth(String),

    /// Output target already holds data
    #[error("Output file {0} already exists.")]
    OutputExists(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using BenchError
pub type Result<T> = std::result::Result<T, BenchError>;
