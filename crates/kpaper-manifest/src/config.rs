//! Build configuration loaded from `kpaper.toml`.
//!
//! ```toml
//! kpaper_version = "2025.7.15.1527"
//! java_version = 21
//! registration_base_package = "cc.modlabs"
//! deliver = ["org.example:foo:1.0"]
//!
//! [[repositories]]
//! url = "https://repo1.maven.org/maven2/"
//!
//! [[repositories]]
//! id = "myrepo"
//! url = "https://example.com/m2/"
//!
//! [configurations.runtimeClasspath]
//! resolvable = true
//! extends = ["api", "implementation"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::coordinate::{DEFAULT_TARGET_VERSION, DependencyCoordinate, TargetLibrary};
use crate::embed::EntryPoints;
use crate::manifest::RepositoryManifest;
use crate::repository::RepositoryDescriptor;
use crate::{Error, Result, io};

/// Canonical file name of the build configuration.
pub const CONFIG_FILENAME: &str = "kpaper.toml";

/// Lowest accepted Java release.
const MIN_JAVA_VERSION: u32 = 8;

fn default_kpaper_version() -> String {
    DEFAULT_TARGET_VERSION.to_string()
}

fn default_java_version() -> u32 {
    21
}

fn default_base_package() -> String {
    "cc.modlabs".to_string()
}

/// A repository declaration: URL only, or id plus URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDeclaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
}

impl RepositoryDeclaration {
    pub fn descriptor(&self) -> RepositoryDescriptor {
        match &self.id {
            Some(id) => RepositoryDescriptor::new(id, &self.url),
            None => RepositoryDescriptor::from_url(&self.url),
        }
    }
}

/// A dependency configuration as declared in `kpaper.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationDeclaration {
    /// Whether the configuration can be resolved into a dependency graph.
    #[serde(default)]
    pub resolvable: bool,
    /// Configurations whose dependencies this one inherits.
    #[serde(default)]
    pub extends: Vec<String>,
    /// Direct dependencies, as `group:artifact:version` strings.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// The build-facing configuration surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Version of the always-delivered runtime library.
    #[serde(default = "default_kpaper_version")]
    pub kpaper_version: String,

    /// Target Java release of the plugin.
    #[serde(default = "default_java_version")]
    pub java_version: u32,

    /// Base package scanned for commands and listeners.
    #[serde(default = "default_base_package")]
    pub registration_base_package: String,

    /// Extra dependencies delivered verbatim.
    #[serde(default)]
    pub deliver: Vec<DependencyCoordinate>,

    /// Overrides the loader entry point written into the descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader: Option<String>,

    /// Overrides the bootstrapper entry point written into the descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrapper: Option<String>,

    #[serde(default)]
    pub repositories: Vec<RepositoryDeclaration>,

    #[serde(default)]
    pub configurations: BTreeMap<String, ConfigurationDeclaration>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            kpaper_version: default_kpaper_version(),
            java_version: default_java_version(),
            registration_base_package: default_base_package(),
            deliver: Vec::new(),
            loader: None,
            bootstrapper: None,
            repositories: Vec::new(),
            configurations: BTreeMap::new(),
        }
    }
}

impl BuildConfig {
    /// Parse and validate configuration text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `kpaper.toml` from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = io::read_text(path)?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.java_version < MIN_JAVA_VERSION {
            return Err(Error::InvalidConfig(format!(
                "java_version {} is below the minimum of {MIN_JAVA_VERSION}",
                self.java_version
            )));
        }

        if !is_package_name(&self.registration_base_package) {
            return Err(Error::InvalidConfig(format!(
                "registration_base_package '{}' is not a valid package name",
                self.registration_base_package
            )));
        }

        if self.kpaper_version.trim().is_empty() {
            return Err(Error::InvalidConfig("kpaper_version is empty".into()));
        }

        Ok(())
    }

    /// The runtime library this build always delivers.
    pub fn target(&self) -> TargetLibrary {
        TargetLibrary::kpaper(&self.kpaper_version)
    }

    /// Declared repositories as a manifest, ids derived where omitted.
    pub fn repositories(&self) -> RepositoryManifest {
        self.repositories
            .iter()
            .map(RepositoryDeclaration::descriptor)
            .collect()
    }

    /// Entry points written into the plugin descriptor.
    pub fn entry_points(&self) -> EntryPoints {
        let mut entry_points = EntryPoints::default();
        if let Some(loader) = &self.loader {
            entry_points.loader = loader.clone();
        }
        if let Some(bootstrapper) = &self.bootstrapper {
            entry_points.bootstrapper = bootstrapper.clone();
        }
        entry_points
    }
}

/// Whether `name` is a dotted sequence of Java identifiers.
pub fn is_package_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_alphabetic() || first == '_' => {
                    chars.all(|c| c.is_alphanumeric() || c == '_')
                }
                _ => false,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BuildConfig::from_toml("").unwrap();
        assert_eq!(config, BuildConfig::default());
        assert_eq!(config.java_version, 21);
        assert_eq!(config.registration_base_package, "cc.modlabs");
        assert_eq!(config.kpaper_version, DEFAULT_TARGET_VERSION);
    }

    #[test]
    fn test_full_config() {
        let toml_str = r#"
kpaper_version = "2024.1.1.0000"
java_version = 17
registration_base_package = "com.example.plugin"
deliver = ["org.example:foo:1.0"]

[[repositories]]
url = "https://repo1.maven.org/maven2/"

[[repositories]]
id = "myrepo"
url = "https://example.com/m2/"

[configurations.runtimeClasspath]
resolvable = true
extends = ["api"]
"#;
        let config = BuildConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.java_version, 17);
        assert_eq!(config.deliver[0].to_string(), "org.example:foo:1.0");
        assert_eq!(config.target().version, "2024.1.1.0000");

        let repos: Vec<_> = config.repositories().iter().cloned().collect();
        assert_eq!(
            repos,
            vec![
                RepositoryDescriptor::new("repo1-maven-org", "https://repo1.maven.org/maven2/"),
                RepositoryDescriptor::new("myrepo", "https://example.com/m2/"),
            ]
        );

        let runtime = &config.configurations["runtimeClasspath"];
        assert!(runtime.resolvable);
        assert_eq!(runtime.extends, vec!["api".to_string()]);
    }

    #[test]
    fn test_invalid_deliver_coordinate_rejected() {
        let err = BuildConfig::from_toml(r#"deliver = ["not-a-coordinate"]"#).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(BuildConfig::from_toml("surprise = true").is_err());
    }

    #[test]
    fn test_java_version_lower_bound() {
        let err = BuildConfig::from_toml("java_version = 7").unwrap_err();
        assert!(err.to_string().contains("java_version"));
    }

    #[test]
    fn test_invalid_base_package() {
        assert!(BuildConfig::from_toml(r#"registration_base_package = "cc..modlabs""#).is_err());
        assert!(BuildConfig::from_toml(r#"registration_base_package = "1cc""#).is_err());
    }

    #[test]
    fn test_entry_point_overrides() {
        let config = BuildConfig::from_toml(r#"loader = "com.custom.Loader""#).unwrap();
        let entry_points = config.entry_points();
        assert_eq!(entry_points.loader, "com.custom.Loader");
        assert_eq!(
            entry_points.bootstrapper,
            EntryPoints::default().bootstrapper
        );
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = BuildConfig::from_toml(r#"deliver = ["a:b:1"]"#).unwrap();
        let rendered = config.to_toml().unwrap();
        assert_eq!(BuildConfig::from_toml(&rendered).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = BuildConfig::load(Path::new("/nonexistent/kpaper.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }
}
