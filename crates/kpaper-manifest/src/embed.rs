//! Embedding generated manifests into the packaged resources.
//!
//! The plugin descriptor is merged, never templated: `loader` and
//! `bootstrapper` are appended only when the user has not set them.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value as YamlValue;
use tracing::{debug, info};

use crate::manifest::{DEPENDENCIES_FILE, EXTENSIONS_FILE, REPOSITORIES_FILE};
use crate::{Error, Result, io};

/// File name of the plugin descriptor inside the resources directory.
pub const DESCRIPTOR_FILE: &str = "paper-plugin.yml";

pub const DEFAULT_LOADER: &str = "cc.modlabs.registration.DependencyLoader";
pub const DEFAULT_BOOTSTRAPPER: &str = "cc.modlabs.registration.CommandBootstrapper";

const LOADER_KEY: &str = "loader";
const BOOTSTRAPPER_KEY: &str = "bootstrapper";

/// Fully-qualified bootstrap entry points referenced by the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoints {
    pub loader: String,
    pub bootstrapper: String,
}

impl Default for EntryPoints {
    fn default() -> Self {
        Self {
            loader: DEFAULT_LOADER.to_string(),
            bootstrapper: DEFAULT_BOOTSTRAPPER.to_string(),
        }
    }
}

/// Result of patching the descriptor file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorPatch {
    /// No descriptor exists in the resources directory.
    Missing,
    /// Both entries were already present.
    Unchanged,
    /// The listed keys were appended.
    Appended(Vec<&'static str>),
}

/// Outcome of [`Embedder::embed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedReport {
    pub copied: Vec<&'static str>,
    pub removed: Vec<&'static str>,
    pub descriptor: DescriptorPatch,
}

/// Copies manifests into the resources directory and patches the
/// descriptor there.
#[derive(Debug, Clone)]
pub struct Embedder {
    generated_dir: PathBuf,
    resources_dir: PathBuf,
    entry_points: EntryPoints,
}

impl Embedder {
    pub fn new(
        generated_dir: impl Into<PathBuf>,
        resources_dir: impl Into<PathBuf>,
        entry_points: EntryPoints,
    ) -> Self {
        Self {
            generated_dir: generated_dir.into(),
            resources_dir: resources_dir.into(),
            entry_points,
        }
    }

    /// Copy every generated manifest and patch the descriptor.
    pub fn embed(&self) -> Result<EmbedReport> {
        fs::create_dir_all(&self.resources_dir).map_err(|e| Error::io(&self.resources_dir, e))?;

        let mut copied = Vec::new();
        let mut removed = Vec::new();
        for name in [DEPENDENCIES_FILE, REPOSITORIES_FILE, EXTENSIONS_FILE] {
            let source = self.generated_dir.join(name);
            let target = self.resources_dir.join(name);
            match io::read_optional(&source)? {
                Some(content) => {
                    io::write_if_changed(&target, content.as_bytes())?;
                    copied.push(name);
                }
                None => {
                    if io::remove_if_exists(&target)? {
                        removed.push(name);
                    }
                }
            }
        }

        let descriptor = self.patch_descriptor_file()?;

        info!(
            resources = %self.resources_dir.display(),
            copied = copied.len(),
            removed = removed.len(),
            descriptor = ?descriptor,
            "embedded delivery manifests"
        );

        Ok(EmbedReport {
            copied,
            removed,
            descriptor,
        })
    }

    /// Patch `paper-plugin.yml` in the resources directory.
    ///
    /// A missing descriptor is not an error: nothing is being packaged.
    pub fn patch_descriptor_file(&self) -> Result<DescriptorPatch> {
        let path = self.resources_dir.join(DESCRIPTOR_FILE);
        let Some(content) = io::read_optional(&path)? else {
            debug!(path = %path.display(), "no plugin descriptor, skipping patch");
            return Ok(DescriptorPatch::Missing);
        };

        let (patched, appended) = patch_descriptor(&content, &self.entry_points)
            .map_err(|message| Error::DescriptorParse {
                path: path.clone(),
                message,
            })?;

        if appended.is_empty() {
            return Ok(DescriptorPatch::Unchanged);
        }

        io::write_atomic(&path, patched.as_bytes())?;
        Ok(DescriptorPatch::Appended(appended))
    }

    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }
}

/// Append missing `loader`/`bootstrapper` entries to descriptor text.
///
/// Returns the new text and the keys that were appended. Existing entries
/// are never touched, and the rest of the file is preserved byte for byte.
pub fn patch_descriptor(
    content: &str,
    entry_points: &EntryPoints,
) -> std::result::Result<(String, Vec<&'static str>), String> {
    let present = top_level_keys(content)?;

    let mut appended = Vec::new();
    let mut lines = Vec::new();
    if !present.iter().any(|k| k == LOADER_KEY) {
        lines.push(format!("{LOADER_KEY}: {}", entry_points.loader));
        appended.push(LOADER_KEY);
    }
    if !present.iter().any(|k| k == BOOTSTRAPPER_KEY) {
        lines.push(format!("{BOOTSTRAPPER_KEY}: {}", entry_points.bootstrapper));
        appended.push(BOOTSTRAPPER_KEY);
    }

    if lines.is_empty() {
        return Ok((content.to_string(), appended));
    }

    let mut patched = content.to_string();
    if !patched.is_empty() && !patched.ends_with('\n') {
        patched.push('\n');
    }
    patched.push_str(&lines.join("\n"));
    patched.push('\n');

    Ok((patched, appended))
}

fn top_level_keys(content: &str) -> std::result::Result<Vec<String>, String> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: YamlValue = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    match value {
        YamlValue::Mapping(mapping) => Ok(mapping
            .keys()
            .filter_map(|k| k.as_str().map(str::to_owned))
            .collect()),
        YamlValue::Null => Ok(Vec::new()),
        _ => Err("descriptor is not a YAML mapping".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_appends_both_when_absent() {
        let (patched, appended) =
            patch_descriptor("name: Demo\nversion: 1.0\n", &EntryPoints::default()).unwrap();
        assert_eq!(appended, vec!["loader", "bootstrapper"]);
        assert_eq!(
            patched,
            format!(
                "name: Demo\nversion: 1.0\nloader: {DEFAULT_LOADER}\nbootstrapper: {DEFAULT_BOOTSTRAPPER}\n"
            )
        );
    }

    #[test]
    fn test_existing_loader_untouched() {
        let content = "name: Demo\nloader: com.custom.Loader\n";
        let (patched, appended) = patch_descriptor(content, &EntryPoints::default()).unwrap();
        assert_eq!(appended, vec!["bootstrapper"]);
        assert!(patched.starts_with(content));
        assert!(patched.contains("loader: com.custom.Loader"));
        assert!(!patched.contains(DEFAULT_LOADER));
    }

    #[test]
    fn test_missing_trailing_newline_gets_separator() {
        let (patched, _) = patch_descriptor("name: Demo", &EntryPoints::default()).unwrap();
        assert!(patched.starts_with("name: Demo\nloader: "));
    }

    #[rstest]
    #[case::nested_loader_key("name: Demo\ndependencies:\n  loader: something\n", &["loader", "bootstrapper"])]
    #[case::empty("", &["loader", "bootstrapper"])]
    #[case::bootstrapper_only("bootstrapper: c.D\n", &["loader"])]
    #[case::both_present("loader: a.B\nbootstrapper: c.D\n", &[])]
    #[case::quoted_keys("\"loader\": a.B\n'bootstrapper': c.D\n", &[])]
    fn test_appended_keys(#[case] content: &str, #[case] expected: &[&str]) {
        let (patched, appended) = patch_descriptor(content, &EntryPoints::default()).unwrap();
        assert_eq!(appended, expected);
        assert!(patched.starts_with(content));
        if expected.is_empty() {
            assert_eq!(patched, content);
        }
    }

    #[test]
    fn test_non_mapping_descriptor_is_error() {
        assert!(patch_descriptor("- a\n- b\n", &EntryPoints::default()).is_err());
    }
}
