//! Flat text manifests handed from build time to load time.
//!
//! # Dependency manifest (`.dependencies`)
//!
//! ```text
//! cc.modlabs:KPaper:2025.7.15.1527
//! org.example:foo:1.0
//! ```
//!
//! One coordinate per line, sorted, no comments.
//!
//! # Repository manifest (`.repositories`)
//!
//! ```text
//! # optional comments
//! myrepo https://example.com/m2/
//! https://other.com/m2/
//! ```
//!
//! One repository per line, either `id url` or a bare URL. The file is
//! omitted entirely when the build declares no repositories.

use std::collections::BTreeSet;
use std::path::Path;

use crate::coordinate::DependencyCoordinate;
use crate::repository::RepositoryDescriptor;
use crate::{Error, Result, io};

/// Resource name of the dependency manifest.
pub const DEPENDENCIES_FILE: &str = ".dependencies";

/// Resource name of the optional repository manifest.
pub const REPOSITORIES_FILE: &str = ".repositories";

/// Resource name of the extension registry manifest.
pub const EXTENSIONS_FILE: &str = ".extensions";

/// Deduplicated set of coordinates delivered with the plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyManifest {
    coordinates: BTreeSet<DependencyCoordinate>,
}

impl DependencyManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a coordinate. Returns `false` if it was already present.
    pub fn insert(&mut self, coordinate: DependencyCoordinate) -> bool {
        self.coordinates.insert(coordinate)
    }

    pub fn contains(&self, coordinate: &DependencyCoordinate) -> bool {
        self.coordinates.contains(coordinate)
    }

    /// Coordinates in canonical (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = &DependencyCoordinate> {
        self.coordinates.iter()
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Parse manifest text. Blank lines are ignored; any other line must
    /// be a valid coordinate.
    pub fn parse(content: &str) -> Result<Self> {
        let mut manifest = Self::new();
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let coordinate =
                trimmed
                    .parse::<DependencyCoordinate>()
                    .map_err(|e| Error::MalformedManifest {
                        manifest: DEPENDENCIES_FILE,
                        line: index + 1,
                        reason: e.to_string(),
                    })?;
            manifest.insert(coordinate);
        }
        Ok(manifest)
    }

    /// Render the manifest text: sorted lines, newline terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for coordinate in &self.coordinates {
            out.push_str(&coordinate.to_string());
            out.push('\n');
        }
        out
    }

    /// Read `.dependencies` from a resource directory.
    pub fn read_from(dir: &Path) -> Result<Self> {
        let content = io::read_text(&dir.join(DEPENDENCIES_FILE))?;
        Self::parse(&content)
    }

    /// Write `.dependencies` into `dir`, replacing any previous file.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        io::write_if_changed(&dir.join(DEPENDENCIES_FILE), self.render().as_bytes())?;
        Ok(())
    }
}

impl FromIterator<DependencyCoordinate> for DependencyManifest {
    fn from_iter<I: IntoIterator<Item = DependencyCoordinate>>(iter: I) -> Self {
        Self {
            coordinates: iter.into_iter().collect(),
        }
    }
}

impl Extend<DependencyCoordinate> for DependencyManifest {
    fn extend<I: IntoIterator<Item = DependencyCoordinate>>(&mut self, iter: I) {
        self.coordinates.extend(iter);
    }
}

/// User-declared repositories, in declaration order.
///
/// Ids are unique within one manifest: adding a repository whose id is
/// already present replaces the earlier URL in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryManifest {
    repositories: Vec<RepositoryDescriptor>,
}

impl RepositoryManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, repository: RepositoryDescriptor) {
        match self
            .repositories
            .iter_mut()
            .find(|existing| existing.id == repository.id)
        {
            Some(existing) => existing.url = repository.url,
            None => self.repositories.push(repository),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepositoryDescriptor> {
        self.repositories.iter()
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Parse manifest text. Parsing is total: every non-blank,
    /// non-comment line yields a descriptor.
    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .filter_map(RepositoryDescriptor::parse_line)
            .collect()
    }

    /// Render `id url` lines, newline terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for repository in &self.repositories {
            out.push_str(&repository.to_string());
            out.push('\n');
        }
        out
    }

    /// Read `.repositories` from a resource directory.
    ///
    /// Returns `Ok(None)` when the file is absent.
    pub fn read_from(dir: &Path) -> Result<Option<Self>> {
        Ok(io::read_optional(&dir.join(REPOSITORIES_FILE))?.map(|c| Self::parse(&c)))
    }

    /// Write `.repositories` into `dir`, or remove a stale file when
    /// `manifest` is empty. Returns whether a file was written.
    pub fn sync_to(manifest: &Self, dir: &Path) -> Result<bool> {
        let path = dir.join(REPOSITORIES_FILE);
        if manifest.is_empty() {
            if io::remove_if_exists(&path)? {
                tracing::debug!(path = %path.display(), "removed stale repository manifest");
            }
            return Ok(false);
        }
        io::write_if_changed(&path, manifest.render().as_bytes())?;
        Ok(true)
    }
}

impl FromIterator<RepositoryDescriptor> for RepositoryManifest {
    fn from_iter<I: IntoIterator<Item = RepositoryDescriptor>>(iter: I) -> Self {
        let mut manifest = Self::new();
        for repository in iter {
            manifest.push(repository);
        }
        manifest
    }
}
