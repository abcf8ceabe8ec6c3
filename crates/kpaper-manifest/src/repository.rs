//! Remote repository descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::{Error, Result};

/// Identifier of the always-present fallback mirror.
pub const DEFAULT_REPOSITORY_ID: &str = "modlabs";

/// URL of the always-present fallback mirror.
pub const DEFAULT_REPOSITORY_URL: &str = "https://nexus.modlabs.cc/repository/maven-mirrors/";

/// A remote Maven repository identified by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub id: String,
    pub url: String,
}

impl RepositoryDescriptor {
    /// Repository with an explicit id.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Repository whose id is derived from its URL.
    ///
    /// The id is the URL host with every character outside `[A-Za-z0-9_-]`
    /// replaced by `-`. When no host can be parsed the id falls back to a
    /// digest of the URL, so it is never empty.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let id = derive_id(&url);
        Self { id, url }
    }

    /// The fallback mirror every resolver session starts with.
    pub fn default_mirror() -> Self {
        Self::new(DEFAULT_REPOSITORY_ID, DEFAULT_REPOSITORY_URL)
    }

    /// Parse one line of a repository manifest.
    ///
    /// Blank lines and `#` comments yield `None`. Every other line yields
    /// exactly one descriptor: `id url` when the line splits into two
    /// tokens on its first run of whitespace, otherwise a bare URL with a
    /// derived id.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        match trimmed.split_once(char::is_whitespace) {
            Some((id, rest)) => Some(Self::new(id, rest.trim_start())),
            None => Some(Self::from_url(trimmed)),
        }
    }

    /// Check that the URL is usable as a remote repository.
    pub fn validate(&self) -> Result<Url> {
        let invalid = |reason: String| Error::InvalidRepository {
            input: format!("{} {}", self.id, self.url),
            reason,
        };

        if self.id.is_empty() {
            return Err(invalid("id is empty".into()));
        }

        let parsed = Url::parse(&self.url).map_err(|e| invalid(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" | "file" => Ok(parsed),
            other => Err(invalid(format!("unsupported scheme '{other}'"))),
        }
    }
}

impl fmt::Display for RepositoryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.url)
    }
}

fn derive_id(url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .filter(|h| !h.is_empty());

    match host {
        Some(host) => host
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect(),
        None => {
            let digest = Sha256::digest(url.as_bytes());
            let short: String = digest[..4].iter().map(|b| format!("{b:02x}")).collect();
            format!("repo-{short}")
        }
    }
}
