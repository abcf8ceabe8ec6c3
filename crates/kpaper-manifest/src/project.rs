//! Project model: the dependency configurations the generator walks.
//!
//! Applying the build configuration mirrors what the build plugin does to
//! a project: the target library is added to `api`, every delivered
//! dependency to `implementation`, and the standard resolvable classpaths
//! inherit from both.

use std::collections::{BTreeMap, HashSet};

use crate::config::{BuildConfig, ConfigurationDeclaration};
use crate::coordinate::DependencyCoordinate;
use crate::{Error, Result};

pub const API: &str = "api";
pub const IMPLEMENTATION: &str = "implementation";
pub const COMPILE_CLASSPATH: &str = "compileClasspath";
pub const RUNTIME_CLASSPATH: &str = "runtimeClasspath";

/// A dependency graph the generator can aggregate over.
pub trait Configuration {
    fn name(&self) -> &str;

    /// Whether the configuration can be resolved at all. Non-resolvable
    /// configurations are buckets that only feed other configurations.
    fn is_resolvable(&self) -> bool;

    /// Resolve the first-level module dependencies.
    fn first_level_dependencies(&self) -> Result<Vec<DependencyCoordinate>>;
}

/// A configuration of a [`Project`], resolved against its siblings.
#[derive(Debug, Clone, Copy)]
pub struct DeclaredConfiguration<'a> {
    name: &'a str,
    project: &'a Project,
}

impl Configuration for DeclaredConfiguration<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn is_resolvable(&self) -> bool {
        self.project
            .configurations
            .get(self.name)
            .is_some_and(|c| c.resolvable)
    }

    fn first_level_dependencies(&self) -> Result<Vec<DependencyCoordinate>> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        self.project.collect(self.name, &mut visited, &mut out)?;
        Ok(out)
    }
}

/// The set of configurations of a plugin project.
#[derive(Debug, Clone, Default)]
pub struct Project {
    configurations: BTreeMap<String, ConfigurationDeclaration>,
}

impl Project {
    /// Project with exactly the given configurations.
    pub fn new(configurations: BTreeMap<String, ConfigurationDeclaration>) -> Self {
        Self { configurations }
    }

    /// Build the project model the way the build plugin applies itself.
    pub fn from_config(config: &BuildConfig) -> Result<Self> {
        let mut configurations = config.configurations.clone();

        let target = config.target().coordinate()?;
        configurations
            .entry(API.to_string())
            .or_default()
            .dependencies
            .push(target.to_string());

        let implementation = configurations.entry(IMPLEMENTATION.to_string()).or_default();
        implementation
            .dependencies
            .extend(config.deliver.iter().map(ToString::to_string));

        for classpath in [COMPILE_CLASSPATH, RUNTIME_CLASSPATH] {
            configurations
                .entry(classpath.to_string())
                .or_insert_with(|| ConfigurationDeclaration {
                    resolvable: true,
                    extends: vec![API.to_string(), IMPLEMENTATION.to_string()],
                    dependencies: Vec::new(),
                });
        }

        Ok(Self { configurations })
    }

    /// All configurations, sorted by name.
    pub fn configurations(&self) -> Vec<DeclaredConfiguration<'_>> {
        self.configurations
            .keys()
            .map(|name| DeclaredConfiguration {
                name,
                project: self,
            })
            .collect()
    }

    pub fn configuration(&self, name: &str) -> Option<DeclaredConfiguration<'_>> {
        self.configurations
            .get_key_value(name)
            .map(|(name, _)| DeclaredConfiguration {
                name,
                project: self,
            })
    }

    fn collect(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
        out: &mut Vec<DependencyCoordinate>,
    ) -> Result<()> {
        if !visited.insert(name.to_string()) {
            return Ok(());
        }

        let declaration = self.configurations.get(name).ok_or_else(|| Error::Resolution {
            name: name.to_string(),
            reason: "configuration does not exist".into(),
        })?;

        for raw in &declaration.dependencies {
            let coordinate = raw.parse().map_err(|e: Error| Error::Resolution {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
            out.push(coordinate);
        }

        for parent in &declaration.extends {
            self.collect(parent, visited, out)
                .map_err(|e| match e {
                    Error::Resolution { reason, .. } => Error::Resolution {
                        name: name.to_string(),
                        reason: format!("via '{parent}': {reason}"),
                    },
                    other => other,
                })?;
        }

        Ok(())
    }
}
