//! The bootstrapper phase: register discovered commands and listeners.

use std::path::{Path, PathBuf};

use kpaper_loader::ClasspathAdditions;
use tracing::{debug, info, warn};

use crate::capability::{Capability, ExtensionCandidate};
use crate::catalog::ExtensionCatalog;
use crate::discovery::{Discovery, SkipReason};
use crate::error::{HostError, Result};
use crate::host::{CommandRegistrar, EventRegistrar};
use crate::registry::RegistryManifest;

/// What one registration pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSummary {
    pub capability: Capability,
    pub registered: Vec<String>,
    pub failed: Vec<(String, HostError)>,
    pub skipped: Vec<(ExtensionCandidate, SkipReason)>,
    /// Artifacts the loader phase put on the classpath the extensions were
    /// registered against.
    pub classpath: Vec<PathBuf>,
}

impl RegistrationSummary {
    fn new(capability: Capability, additions: &ClasspathAdditions) -> Self {
        Self {
            capability,
            registered: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            classpath: additions.paths().map(Path::to_path_buf).collect(),
        }
    }

    /// Number of successful registrations.
    pub fn count(&self) -> usize {
        self.registered.len()
    }
}

/// Registers a plugin's extensions with the host.
///
/// Constructing one requires the [`ClasspathAdditions`] produced by the
/// loader phase, so registration cannot run before resolution.
pub struct Bootstrapper {
    additions: ClasspathAdditions,
    catalog: ExtensionCatalog,
    base_package: String,
    registry: Option<RegistryManifest>,
}

impl Bootstrapper {
    pub fn new(
        additions: ClasspathAdditions,
        catalog: ExtensionCatalog,
        base_package: impl Into<String>,
    ) -> Self {
        Self {
            additions,
            catalog,
            base_package: base_package.into(),
            registry: None,
        }
    }

    /// Restrict discovery to the classes listed in `registry`.
    #[must_use]
    pub fn with_registry(mut self, registry: RegistryManifest) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Like [`Bootstrapper::new`], using the `.extensions` registry in
    /// `resources_dir` when the plugin ships one.
    pub fn from_resources(
        additions: ClasspathAdditions,
        catalog: ExtensionCatalog,
        base_package: impl Into<String>,
        resources_dir: &Path,
    ) -> Result<Self> {
        let bootstrapper = Self::new(additions, catalog, base_package);
        Ok(match RegistryManifest::read_from(resources_dir)? {
            Some(registry) => bootstrapper.with_registry(registry),
            None => bootstrapper,
        })
    }

    pub fn additions(&self) -> &ClasspathAdditions {
        &self.additions
    }

    pub fn registry(&self) -> Option<&RegistryManifest> {
        self.registry.as_ref()
    }

    /// Register every discovered command with the host.
    ///
    /// A command the host rejects is logged and counted; the remaining
    /// commands are still registered.
    pub fn register_commands(&self, registrar: &mut dyn CommandRegistrar) -> RegistrationSummary {
        debug!(artifacts = self.additions.len(), "registering commands");
        let mut summary = RegistrationSummary::new(Capability::Command, &self.additions);

        for discovery in self
            .catalog
            .discover_commands(&self.base_package, self.registry.as_ref())
        {
            match discovery {
                Discovery::Matched {
                    candidate,
                    instance,
                } => {
                    let node = instance.register();
                    match registrar.register(node, instance.description(), instance.aliases()) {
                        Ok(()) => {
                            info!("Command {} registered", candidate.simple_name());
                            summary.registered.push(candidate.class_name);
                        }
                        Err(e) => {
                            warn!(class = %candidate.class_name, error = %e, "Failed to register command");
                            summary.failed.push((candidate.class_name, e));
                        }
                    }
                }
                Discovery::Skipped { candidate, reason } => {
                    summary.skipped.push((candidate, reason));
                }
            }
        }

        info!(artifacts = summary.classpath.len(), "Registered {} commands", summary.count());
        summary
    }

    /// Register every discovered listener with the host.
    ///
    /// A listener the host rejects is logged and counted; the remaining
    /// listeners are still registered.
    pub fn register_listeners(&self, registrar: &mut dyn EventRegistrar) -> RegistrationSummary {
        debug!(artifacts = self.additions.len(), "registering listeners");
        let mut summary = RegistrationSummary::new(Capability::Listener, &self.additions);

        for discovery in self
            .catalog
            .discover_listeners(&self.base_package, self.registry.as_ref())
        {
            match discovery {
                Discovery::Matched {
                    candidate,
                    instance,
                } => match registrar.register_listener(instance) {
                    Ok(()) => {
                        info!("Registered listener: {}", candidate.simple_name());
                        summary.registered.push(candidate.class_name);
                    }
                    Err(e) => {
                        warn!(class = %candidate.class_name, error = %e, "Failed to register listener");
                        summary.failed.push((candidate.class_name, e));
                    }
                },
                Discovery::Skipped { candidate, reason } => {
                    summary.skipped.push((candidate, reason));
                }
            }
        }

        info!(artifacts = summary.classpath.len(), "Registered {} listeners", summary.count());
        summary
    }
}
