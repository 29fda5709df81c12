//! Error types for cluster specifications
//!
//! Loading and validating a specification are the only fallible steps; every
//! derived value is total once a specification exists.

/// Errors while loading or validating a cluster specification
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// Specification is not valid YAML
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Specification is not valid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field is outside its documented range
    #[error("invalid value for {field}: {message}")]
    Validation {
        /// Field path in camelCase, as written in the specification
        field: &'static str,
        /// What was wrong
        message: String,
    },

    /// A secret entry does not hold UTF-8 text
    #[error("secret key '{key}' is not valid UTF-8")]
    InvalidSecret {
        /// Offending secret key
        key: String,
    },
}

impl ClusterError {
    /// Create validation error for field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Result type alias for cluster operations
pub type ClusterResult<T> = Result<T, ClusterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ClusterError::validation("spec.patroni.syncPeriodSeconds", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid value for spec.patroni.syncPeriodSeconds: must be at least 1"
        );
    }

    #[test]
    fn secret_error_display() {
        let err = ClusterError::InvalidSecret {
            key: "dbname".to_string(),
        };
        assert_eq!(err.to_string(), "secret key 'dbname' is not valid UTF-8");
    }
}
