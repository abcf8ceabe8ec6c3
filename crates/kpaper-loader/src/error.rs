use std::path::PathBuf;

/// Errors that abort the loader phase.
///
/// Every variant is fatal to plugin startup: the host cannot run a plugin
/// whose declared dependencies are missing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Dependency manifest absent from the plugin resources.
    #[error("dependency manifest not found at {0}")]
    ManifestMissing(PathBuf),

    /// Reading or parsing a manifest, or writing the artifact cache.
    #[error(transparent)]
    Manifest(#[from] kpaper_manifest::Error),

    /// No registered repository could serve the coordinate.
    #[error("could not resolve {coordinate}: {}", attempts.join("; "))]
    Unresolved {
        coordinate: String,
        attempts: Vec<String>,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The blocking runtime for the host thread could not be started.
    #[error("failed to start resolver runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
