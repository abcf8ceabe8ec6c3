//! Build-time side of KPaper plugin delivery.
//!
//! Aggregates the runtime libraries a plugin must ship into a flat
//! dependency manifest, records user repositories in a repository
//! manifest, and embeds both into the packaged resources alongside a
//! patched plugin descriptor.

pub mod config;
pub mod coordinate;
pub mod embed;
pub mod error;
pub mod generator;
pub mod io;
pub mod manifest;
pub mod project;
pub mod repository;

pub use config::{BuildConfig, CONFIG_FILENAME, RepositoryDeclaration};
pub use coordinate::{DependencyCoordinate, TargetLibrary};
pub use embed::{DescriptorPatch, EmbedReport, Embedder, EntryPoints};
pub use error::{Error, Result};
pub use generator::{GenerationReport, ManifestGenerator, SkippedConfiguration};
pub use manifest::{
    DEPENDENCIES_FILE, DependencyManifest, EXTENSIONS_FILE, REPOSITORIES_FILE, RepositoryManifest,
};
pub use project::{Configuration, Project};
pub use repository::RepositoryDescriptor;
