//! The statically built extension registry (`.extensions`).
//!
//! ```text
//! command cc.modlabs.commands.Ping
//! listener cc.modlabs.listeners.JoinListener
//! ```
//!
//! Entries are sorted by class name. Blank lines and
//! `#` comments are ignored when reading.

use std::collections::BTreeSet;
use std::path::Path;

use kpaper_manifest::{EXTENSIONS_FILE, io};

use crate::capability::{Capability, ExtensionCandidate};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryManifest {
    entries: BTreeSet<ExtensionCandidate>,
}

impl RegistryManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the entry was already present.
    pub fn insert(&mut self, candidate: ExtensionCandidate) -> bool {
        self.entries.insert(candidate)
    }

    pub fn contains(&self, class_name: &str, capability: Capability) -> bool {
        self.entries
            .contains(&ExtensionCandidate::new(class_name, capability))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtensionCandidate> {
        self.entries.iter()
    }

    /// Class names registered for `capability`, sorted.
    pub fn classes(&self, capability: Capability) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |entry| entry.capability == capability)
            .map(|entry| entry.class_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut manifest = Self::new();
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let malformed = |reason: String| Error::MalformedRegistry {
                line: index + 1,
                reason,
            };
            let mut tokens = trimmed.split_whitespace();
            let (Some(keyword), Some(class_name), None) =
                (tokens.next(), tokens.next(), tokens.next())
            else {
                return Err(malformed(format!(
                    "expected '<capability> <class>', found '{trimmed}'"
                )));
            };
            let capability = keyword.parse::<Capability>().map_err(malformed)?;
            manifest.insert(ExtensionCandidate::new(class_name, capability));
        }
        Ok(manifest)
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{} {}\n", entry.capability, entry.class_name))
            .collect()
    }

    /// Read `.extensions` from `dir`, `None` when the file is absent.
    pub fn read_from(dir: &Path) -> Result<Option<Self>> {
        match io::read_optional(&dir.join(EXTENSIONS_FILE))? {
            Some(content) => Self::parse(&content).map(Some),
            None => Ok(None),
        }
    }

    pub fn write_to(&self, dir: &Path) -> Result<()> {
        io::write_if_changed(&dir.join(EXTENSIONS_FILE), self.render().as_bytes())?;
        Ok(())
    }
}

impl FromIterator<ExtensionCandidate> for RegistryManifest {
    fn from_iter<I: IntoIterator<Item = ExtensionCandidate>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
