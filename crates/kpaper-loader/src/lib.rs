//! Load-time side of KPaper plugin delivery.
//!
//! The loader phase reads the manifests embedded in the plugin, builds a
//! resolver session seeded with the default mirror and any user
//! repositories, and resolves every listed coordinate. Its output,
//! [`ClasspathAdditions`], is the only input the bootstrapper phase
//! accepts from it.

pub mod error;
pub mod loader;
pub mod maven;
pub mod resolver;
pub mod session;

pub use error::{Error, Result};
pub use loader::{ClasspathAdditions, LoaderPhase, PreparedSession, RejectedRepository};
pub use maven::{MavenResolver, RetryPolicy};
pub use resolver::{ArtifactResolver, ResolvedArtifact};
pub use session::{RemoteRepository, ResolverSession};
