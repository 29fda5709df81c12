//! Error types for document rendering
//!
//! Assembling a document never fails; only turning it into text can.

/// Errors while serializing an assembled document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// YAML emitter failed
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON emitter failed
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for document rendering
pub type DocumentResult<T> = Result<T, DocumentError>;
