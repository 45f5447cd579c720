//! Error types for model schema compilation

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema compilation errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Unsupported type: {token}")]
    UnsupportedType { token: String },

    #[error("type is not an array of length 1 (found {len} elements)")]
    InvalidArrayType { len: usize },

    #[error("Cyclic model reference: {path}")]
    CyclicModel { path: String },

    #[error("Unknown model '{name}' referenced by '{referenced_by}'")]
    UnknownModel { name: String, referenced_by: String },

    #[error("Model '{name}' is defined more than once")]
    DuplicateModel { name: String },

    #[error("Invalid model format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SchemaError {
    /// Whether the error comes from a bad model description rather than the environment
    pub fn is_model_error(&self) -> bool {
        matches!(
            self,
            SchemaError::UnsupportedType { .. }
                | SchemaError::InvalidArrayType { .. }
                | SchemaError::CyclicModel { .. }
                | SchemaError::UnknownModel { .. }
                | SchemaError::DuplicateModel { .. }
                | SchemaError::InvalidFormat(_)
        )
    }
}
