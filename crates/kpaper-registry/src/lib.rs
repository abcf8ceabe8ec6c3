//! Extension registration for KPaper plugins.
//!
//! At build time [`SourceIndex`] reads the plugin sources and writes the
//! `.extensions` registry: the command and listener classes the plugin
//! ships. At load time the [`Bootstrapper`] takes the loader phase's
//! [`kpaper_loader::ClasspathAdditions`], instantiates those classes from
//! an [`ExtensionCatalog`] and hands them to the host's registrars.

pub mod bootstrap;
pub mod capability;
pub mod catalog;
pub mod discovery;
pub mod error;
pub mod host;
pub mod registry;
pub mod source_index;

pub use bootstrap::{Bootstrapper, RegistrationSummary};
pub use capability::{
    Capability, CommandBuilder, CommandNode, Extension, ExtensionCandidate, Listener,
};
pub use catalog::{ExtensionCatalog, Factory};
pub use discovery::{Discovery, SkipReason};
pub use error::{Error, HostError, Result};
pub use host::{CommandRegistrar, EventRegistrar};
pub use registry::RegistryManifest;
pub use source_index::{IndexEntry, IndexReport, Language, SOURCE_ROOTS, SkippedClass, SourceIndex};
