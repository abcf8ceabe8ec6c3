//! The loader phase: manifests in, classpath additions out.

use std::path::{Path, PathBuf};

use kpaper_manifest::{DEPENDENCIES_FILE, DependencyManifest, RepositoryDescriptor, RepositoryManifest, io};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::resolver::{ArtifactResolver, ResolvedArtifact};
use crate::session::ResolverSession;

/// Artifacts the loader phase added to the plugin classpath.
///
/// This is the hand-off from the loader phase to the bootstrapper phase:
/// the bootstrapper cannot be constructed without it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClasspathAdditions {
    artifacts: Vec<ResolvedArtifact>,
}

impl ClasspathAdditions {
    pub fn new(artifacts: Vec<ResolvedArtifact>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &[ResolvedArtifact] {
        &self.artifacts
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.artifacts.iter().map(|a| a.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// A repository line that was skipped while preparing the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRepository {
    pub repository: RepositoryDescriptor,
    pub reason: String,
}

/// A session ready to resolve, plus whatever was skipped building it.
#[derive(Debug, Clone)]
pub struct PreparedSession {
    pub session: ResolverSession,
    /// `None` when the plugin ships no repository manifest.
    pub custom_repositories: Option<usize>,
    pub rejected: Vec<RejectedRepository>,
}

/// Reads the embedded manifests and resolves them into classpath additions.
pub struct LoaderPhase<R> {
    resources_dir: PathBuf,
    default_repository: RepositoryDescriptor,
    resolver: R,
}

impl<R: ArtifactResolver> LoaderPhase<R> {
    /// `default_repository` is registered ahead of any user repository in
    /// every session.
    pub fn new(
        resources_dir: impl Into<PathBuf>,
        default_repository: RepositoryDescriptor,
        resolver: R,
    ) -> Self {
        Self {
            resources_dir: resources_dir.into(),
            default_repository,
            resolver,
        }
    }

    /// Build the resolver session from the embedded manifests.
    ///
    /// A missing or malformed dependency manifest is fatal. A malformed
    /// repository line is logged and skipped, as is one reusing the default
    /// repository's id: the default mirror cannot be overridden.
    pub fn prepare(&self) -> Result<PreparedSession> {
        let mut session = ResolverSession::new();

        let dependencies_path = self.resources_dir.join(DEPENDENCIES_FILE);
        let content = io::read_optional(&dependencies_path)?
            .ok_or_else(|| Error::ManifestMissing(dependencies_path.clone()))?;
        for coordinate in DependencyManifest::parse(&content)?.iter() {
            info!(coordinate = %coordinate, "adding dependency");
            session.add_dependency(coordinate.clone());
        }

        session.add_repository(&self.default_repository)?;

        let repositories = match RepositoryManifest::read_from(&self.resources_dir) {
            Ok(repositories) => repositories,
            Err(e) => {
                warn!(error = %e, "failed to read repository manifest, using default repository only");
                None
            }
        };

        let mut rejected = Vec::new();
        let custom_repositories = repositories.as_ref().map(RepositoryManifest::len);
        for repository in repositories.iter().flat_map(|manifest| manifest.iter()) {
            if repository.id == self.default_repository.id {
                warn!(repository = %repository, "repository id is reserved for the default repository");
                rejected.push(RejectedRepository {
                    repository: repository.clone(),
                    reason: format!("id '{}' is reserved for the default repository", repository.id),
                });
                continue;
            }
            if let Err(e) = session.add_repository(repository) {
                warn!(repository = %repository, error = %e, "failed to add repository");
                rejected.push(RejectedRepository {
                    repository: repository.clone(),
                    reason: e.to_string(),
                });
            }
        }

        Ok(PreparedSession {
            session,
            custom_repositories,
            rejected,
        })
    }

    /// Prepare and resolve. Any unresolvable coordinate aborts the phase.
    pub async fn run(&self) -> Result<ClasspathAdditions> {
        let prepared = self.prepare()?;
        let artifacts = self.resolver.resolve(&prepared.session).await?;

        info!(
            artifacts = artifacts.len(),
            repositories = prepared.session.repositories().len(),
            "loader phase complete"
        );

        Ok(ClasspathAdditions::new(artifacts))
    }

    /// Run the phase to completion on the calling thread.
    pub fn run_blocking(&self) -> Result<ClasspathAdditions> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;
        runtime.block_on(self.run())
    }

    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }
}
