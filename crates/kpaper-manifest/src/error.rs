//! Error types for kpaper-manifest

use std::path::PathBuf;

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or reading delivery manifests
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid coordinate '{input}': {reason}")]
    InvalidCoordinate { input: String, reason: String },

    #[error("invalid repository '{input}': {reason}")]
    InvalidRepository { input: String, reason: String },

    #[error("malformed {manifest} entry on line {line}: {reason}")]
    MalformedManifest {
        manifest: &'static str,
        line: usize,
        reason: String,
    },

    #[error("build configuration not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("failed to parse build configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize build configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid build configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration '{name}' failed to resolve: {reason}")]
    Resolution { name: String, reason: String },

    #[error("failed to parse plugin descriptor {path}: {message}")]
    DescriptorParse { path: PathBuf, message: String },

    #[error("lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn coordinate(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
