//! Error handling module for sitecfg
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Unknown settings and missing tag bindings are not errors; they have defined
//! fallbacks and never reach this type.

use thiserror::Error;

use crate::helpers::HelperError;

/// Main error type for sitecfg
#[derive(Error, Debug)]
pub enum SiteError {
    /// Configuration errors (loading, parsing, assembling)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template helper failures
    #[error("Helper error: {0}")]
    Helper(#[from] HelperError),

    /// Invalid regular expression in extension options
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// An extension collaborator rejected its activation
    #[error("Activation of '{name}' failed: {message}")]
    Activation { name: String, message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for sitecfg operations
pub type Result<T> = std::result::Result<T, SiteError>;

// Convenient error constructors
impl SiteError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an activation error for the named collaborator
    pub fn activation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Activation {
            name: name.into(),
            message: message.into(),
        }
    }
}
