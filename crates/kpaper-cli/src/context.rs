//! The plugin project a command operates on.

use std::path::{Path, PathBuf};

use kpaper_manifest::{BuildConfig, CONFIG_FILENAME};
use tracing::debug;

use crate::error::Result;

/// Directory (relative to the project root) the generator writes into.
pub const GENERATED_DIR: &str = "build/generated-resources";

/// Directory (relative to the project root) holding packaged resources.
pub const RESOURCES_DIR: &str = "build/resources/main";

/// Directory (relative to the project root) artifacts are cached in.
pub const CACHE_DIR: &str = "build/kpaper/cache";

pub struct ProjectContext {
    root: PathBuf,
    config: BuildConfig,
}

impl ProjectContext {
    /// Load the project at `root`. A project without `kpaper.toml` uses
    /// the default configuration.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILENAME);
        let config = if config_path.exists() {
            BuildConfig::load(&config_path)?
        } else {
            debug!(path = %config_path.display(), "no build configuration, using defaults");
            BuildConfig::default()
        };

        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.root.join(GENERATED_DIR)
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.root.join(RESOURCES_DIR)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(CACHE_DIR)
    }
}
