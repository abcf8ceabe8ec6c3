//! Library coordinates (`group:artifact:version`).
//!
//! A coordinate's identity is its canonical string form: equality, hashing
//! and ordering all behave as if comparing `"group:artifact:version"`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Group of the runtime library this system always delivers.
pub const TARGET_GROUP: &str = "cc.modlabs";

/// Artifact name of the runtime library this system always delivers.
pub const TARGET_ARTIFACT: &str = "KPaper";

/// Version of the runtime library delivered when the build does not pin one.
pub const DEFAULT_TARGET_VERSION: &str = "2025.7.15.1527";

/// A library release identified by group, artifact and version.
#[derive(Debug, Clone)]
pub struct DependencyCoordinate {
    group: String,
    artifact: String,
    version: String,
}

impl DependencyCoordinate {
    /// Build a coordinate from its parts, validating each segment.
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let coordinate = Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        };
        for (label, segment) in [
            ("group", &coordinate.group),
            ("artifact", &coordinate.artifact),
            ("version", &coordinate.version),
        ] {
            validate_segment(&coordinate, label, segment)?;
        }
        Ok(coordinate)
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether this coordinate names the given library, ignoring version.
    pub fn matches(&self, group: &str, artifact: &str) -> bool {
        self.group == group && self.artifact == artifact
    }

    /// Relative path of the primary jar in the Maven repository layout.
    ///
    /// `org.example:foo:1.0` becomes `org/example/foo/1.0/foo-1.0.jar`.
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group.replace('.', "/"),
            self.artifact,
            self.version,
            self.file_name()
        )
    }

    /// File name of the primary jar (`artifact-version.jar`).
    pub fn file_name(&self) -> String {
        format!("{}-{}.jar", self.artifact, self.version)
    }

    fn canonical_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.group
            .bytes()
            .chain(std::iter::once(b':'))
            .chain(self.artifact.bytes())
            .chain(std::iter::once(b':'))
            .chain(self.version.bytes())
    }
}

fn validate_segment(coordinate: &DependencyCoordinate, label: &str, segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(Error::coordinate(
            coordinate.to_string(),
            format!("{label} is empty"),
        ));
    }
    if segment.contains(':') || segment.chars().any(char::is_whitespace) {
        return Err(Error::coordinate(
            coordinate.to_string(),
            format!("{label} contains ':' or whitespace"),
        ));
    }
    Ok(())
}

impl fmt::Display for DependencyCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl FromStr for DependencyCoordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();
        match parts.as_slice() {
            [group, artifact, version] => Self::new(*group, *artifact, *version),
            _ => Err(Error::coordinate(
                trimmed,
                format!(
                    "expected group:artifact:version, found {} segment(s)",
                    parts.len()
                ),
            )),
        }
    }
}

impl PartialEq for DependencyCoordinate {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group && self.artifact == other.artifact && self.version == other.version
    }
}

impl Eq for DependencyCoordinate {}

impl Hash for DependencyCoordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.canonical_bytes() {
            state.write_u8(byte);
        }
    }
}

impl Ord for DependencyCoordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_bytes().cmp(other.canonical_bytes())
    }
}

impl PartialOrd for DependencyCoordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for DependencyCoordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DependencyCoordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The runtime library that is always delivered with the plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLibrary {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl TargetLibrary {
    /// The KPaper library at the given version.
    pub fn kpaper(version: impl Into<String>) -> Self {
        Self {
            group: TARGET_GROUP.to_string(),
            artifact: TARGET_ARTIFACT.to_string(),
            version: version.into(),
        }
    }

    /// The coordinate the build adds to its `api` configuration.
    pub fn coordinate(&self) -> Result<DependencyCoordinate> {
        DependencyCoordinate::new(&self.group, &self.artifact, &self.version)
    }

    /// Whether `coordinate` is some version of this library.
    pub fn is_match(&self, coordinate: &DependencyCoordinate) -> bool {
        coordinate.matches(&self.group, &self.artifact)
    }
}

impl Default for TargetLibrary {
    fn default() -> Self {
        Self::kpaper(DEFAULT_TARGET_VERSION)
    }
}
