//! Resolver session: the artifacts to fetch and where to look for them.

use kpaper_manifest::{DependencyCoordinate, RepositoryDescriptor};
use url::Url;

use crate::error::Result;

/// A repository that passed validation and is ready to be queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    pub id: String,
    /// Base URL, always ending in `/` so artifact paths join beneath it.
    pub url: Url,
}

impl RemoteRepository {
    pub fn from_descriptor(descriptor: &RepositoryDescriptor) -> Result<Self> {
        let mut url = descriptor.validate()?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            id: descriptor.id.clone(),
            url,
        })
    }

    /// URL of `relative` beneath this repository.
    pub fn artifact_url(&self, relative: &str) -> std::result::Result<Url, url::ParseError> {
        self.url.join(relative)
    }
}

/// Required artifacts and the repositories to resolve them against.
///
/// Repositories are queried in registration order. Registering an id that
/// is already present replaces its URL but keeps its position.
#[derive(Debug, Clone, Default)]
pub struct ResolverSession {
    dependencies: Vec<DependencyCoordinate>,
    repositories: Vec<RemoteRepository>,
}

impl ResolverSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a required artifact. Duplicates are ignored.
    pub fn add_dependency(&mut self, coordinate: DependencyCoordinate) {
        if !self.dependencies.contains(&coordinate) {
            self.dependencies.push(coordinate);
        }
    }

    /// Validate and register a repository.
    pub fn add_repository(&mut self, descriptor: &RepositoryDescriptor) -> Result<()> {
        let repository = RemoteRepository::from_descriptor(descriptor)?;
        match self
            .repositories
            .iter_mut()
            .find(|existing| existing.id == repository.id)
        {
            Some(existing) => existing.url = repository.url,
            None => self.repositories.push(repository),
        }
        Ok(())
    }

    pub fn dependencies(&self) -> &[DependencyCoordinate] {
        &self.dependencies
    }

    pub fn repositories(&self) -> &[RemoteRepository] {
        &self.repositories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_deduplicated_in_order() {
        let mut session = ResolverSession::new();
        session.add_dependency("b:b:1".parse().unwrap());
        session.add_dependency("a:a:1".parse().unwrap());
        session.add_dependency("b:b:1".parse().unwrap());

        let deps: Vec<_> = session.dependencies().iter().map(ToString::to_string).collect();
        assert_eq!(deps, vec!["b:b:1", "a:a:1"]);
    }

    #[test]
    fn test_repository_url_gets_trailing_slash() {
        let mut session = ResolverSession::new();
        session
            .add_repository(&RepositoryDescriptor::new("r", "https://example.com/m2"))
            .unwrap();

        let repo = &session.repositories()[0];
        assert_eq!(repo.url.as_str(), "https://example.com/m2/");
        assert_eq!(
            repo.artifact_url("a/b/1/b-1.jar").unwrap().as_str(),
            "https://example.com/m2/a/b/1/b-1.jar"
        );
    }

    #[test]
    fn test_repository_id_collision_replaces_in_place() {
        let mut session = ResolverSession::new();
        session
            .add_repository(&RepositoryDescriptor::new("a", "https://a.example/"))
            .unwrap();
        session
            .add_repository(&RepositoryDescriptor::new("b", "https://b.example/"))
            .unwrap();
        session
            .add_repository(&RepositoryDescriptor::new("a", "https://a2.example/"))
            .unwrap();

        let repos: Vec<_> = session
            .repositories()
            .iter()
            .map(|r| (r.id.as_str(), r.url.as_str()))
            .collect();
        assert_eq!(
            repos,
            vec![("a", "https://a2.example/"), ("b", "https://b.example/")]
        );
    }

    #[test]
    fn test_invalid_repository_rejected() {
        let mut session = ResolverSession::new();
        assert!(
            session
                .add_repository(&RepositoryDescriptor::new("x", "not-a-url"))
                .is_err()
        );
        assert!(session.repositories().is_empty());
    }
}
