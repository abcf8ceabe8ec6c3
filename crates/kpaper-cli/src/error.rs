//! Error types for kpaper-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from kpaper-manifest
    #[error(transparent)]
    Manifest(#[from] kpaper_manifest::Error),

    /// Error from kpaper-loader
    #[error(transparent)]
    Loader(#[from] kpaper_loader::Error),

    /// Error from kpaper-registry
    #[error(transparent)]
    Registry(#[from] kpaper_registry::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
