//! The artifact resolution seam.

use std::path::PathBuf;

use async_trait::async_trait;
use kpaper_manifest::DependencyCoordinate;

use crate::error::Result;
use crate::session::ResolverSession;

/// A required artifact that is now available on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub coordinate: DependencyCoordinate,
    pub path: PathBuf,
    /// Id of the repository that served it, `None` when it came from the
    /// local cache.
    pub repository: Option<String>,
}

/// Resolves every artifact of a session against its repositories.
///
/// Implementations either resolve the whole session or fail; a partially
/// resolved classpath is never returned.
#[async_trait]
pub trait ArtifactResolver: Send + Sync {
    async fn resolve(&self, session: &ResolverSession) -> Result<Vec<ResolvedArtifact>>;
}
