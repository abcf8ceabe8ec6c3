//! Runtime catalog of extension factories and the discovery step.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::capability::{Capability, CommandBuilder, Extension, ExtensionCandidate, Listener, NESTED_SEPARATOR};
use crate::discovery::{Discovery, SkipReason};
use crate::registry::RegistryManifest;

/// Creates a fresh instance of one extension class.
pub type Factory = Box<dyn Fn() -> Result<Box<dyn Extension>, String> + Send + Sync>;

/// The classes a plugin makes available, keyed by fully-qualified name.
///
/// # Example
///
/// ```
/// use kpaper_registry::{CommandBuilder, CommandNode, Extension, ExtensionCatalog};
///
/// #[derive(Default)]
/// struct Ping;
///
/// impl CommandBuilder for Ping {
///     fn register(&self) -> CommandNode {
///         CommandNode::literal("ping")
///     }
/// }
///
/// impl Extension for Ping {
///     fn into_command(self: Box<Self>) -> Option<Box<dyn CommandBuilder>> {
///         Some(self)
///     }
/// }
///
/// let mut catalog = ExtensionCatalog::new();
/// catalog.register_default::<Ping>("cc.modlabs.commands.Ping");
/// assert_eq!(catalog.discover_commands("cc.modlabs", None).len(), 1);
/// ```
#[derive(Default)]
pub struct ExtensionCatalog {
    factories: BTreeMap<String, Factory>,
}

impl ExtensionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory. A later registration under the same name
    /// replaces the earlier one.
    pub fn register<F>(&mut self, class_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Box<dyn Extension>, String> + Send + Sync + 'static,
    {
        self.factories.insert(class_name.into(), Box::new(factory));
    }

    /// Register a class constructed through its `Default` implementation.
    pub fn register_default<T>(&mut self, class_name: impl Into<String>)
    where
        T: Extension + Default + 'static,
    {
        self.register(class_name, || Ok(Box::new(T::default()) as Box<dyn Extension>));
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.factories.contains_key(class_name)
    }

    /// Registered class names, sorted.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate `class_name`. `None` if it is not in the catalog.
    pub fn instantiate(&self, class_name: &str) -> Option<Result<Box<dyn Extension>, String>> {
        let factory = self.factories.get(class_name)?;
        Some(
            panic::catch_unwind(AssertUnwindSafe(|| factory()))
                .unwrap_or_else(|_| Err("constructor panicked".to_string())),
        )
    }

    pub fn discover_commands(
        &self,
        base_package: &str,
        registry: Option<&RegistryManifest>,
    ) -> Vec<Discovery<Box<dyn CommandBuilder>>> {
        self.discover(base_package, Capability::Command, registry, |extension| {
            extension.into_command()
        })
    }

    pub fn discover_listeners(
        &self,
        base_package: &str,
        registry: Option<&RegistryManifest>,
    ) -> Vec<Discovery<Box<dyn Listener>>> {
        self.discover(base_package, Capability::Listener, registry, |extension| {
            extension.into_listener()
        })
    }

    /// Consider every class in the capability's package, sorted by name.
    ///
    /// With a registry, only the classes it lists for `capability` are
    /// considered; otherwise every class in the catalog is.
    fn discover<T>(
        &self,
        base_package: &str,
        capability: Capability,
        registry: Option<&RegistryManifest>,
        check: impl Fn(Box<dyn Extension>) -> Option<T>,
    ) -> Vec<Discovery<T>> {
        let names: Vec<&str> = match registry {
            Some(registry) => registry.classes(capability).collect(),
            None => self.class_names().collect(),
        };

        names
            .into_iter()
            .filter(|name| capability.covers(base_package, name))
            .map(|name| {
                let candidate = ExtensionCandidate::new(name, capability);
                let outcome = self.consider(name, &check);
                match outcome {
                    Ok(instance) => Discovery::Matched {
                        candidate,
                        instance,
                    },
                    Err(reason) => {
                        debug!(class = %name, capability = %capability, reason = %reason, "skipped");
                        Discovery::Skipped { candidate, reason }
                    }
                }
            })
            .collect()
    }

    fn consider<T>(
        &self,
        name: &str,
        check: &impl Fn(Box<dyn Extension>) -> Option<T>,
    ) -> Result<T, SkipReason> {
        if name.contains(NESTED_SEPARATOR) {
            return Err(SkipReason::NestedType);
        }
        let instance = self
            .instantiate(name)
            .ok_or(SkipReason::NotLoadable)?
            .map_err(SkipReason::InstantiationFailed)?;
        check(instance).ok_or(SkipReason::MissingCapability)
    }
}
