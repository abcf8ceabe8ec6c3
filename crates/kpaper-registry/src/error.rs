//! Error types for kpaper-registry

use std::path::PathBuf;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while indexing sources or reading the registry.
///
/// Discovery and registration never produce these; their failures are
/// reported per class in [`crate::Discovery`] and
/// [`crate::RegistrationSummary`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Manifest(#[from] kpaper_manifest::Error),

    #[error("failed to walk source root {root}: {message}")]
    Walk { root: PathBuf, message: String },

    #[error("malformed registry entry on line {line}: {reason}")]
    MalformedRegistry { line: usize, reason: String },

    #[error("invalid base package '{0}'")]
    InvalidBasePackage(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure reported by the host while registering a command or listener.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
