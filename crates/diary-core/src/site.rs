//! Site root and the directory layout derived from its configuration.

use std::path::{Path, PathBuf};

use crate::{
    config::{CONFIG_FILE, Config},
    error::Result,
};

/// Directory under the source directory holding post files.
pub const POSTS_DIR: &str = "_posts";

/// A loaded site: its root directory plus merged configuration.
#[derive(Debug, Clone)]
pub struct Site {
    base_dir: PathBuf,
    config: Config,
}

impl Site {
    /// Load the configuration found under `base_dir`.
    pub fn load(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let config = Config::load(&base_dir)?;
        Ok(Self::new(base_dir, config))
    }

    pub fn new(base_dir: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            base_dir: base_dir.into(),
            config,
        }
    }

    /// Whether `dir` looks like a site root, i.e. holds a `_config.yml`.
    pub fn is_site_root(dir: &Path) -> bool {
        dir.join(CONFIG_FILE).is_file()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn source_dir(&self) -> PathBuf {
        self.base_dir.join(&self.config.source_dir)
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.source_dir().join(POSTS_DIR)
    }

    /// Source images served under `/images`.
    pub fn images_dir(&self) -> PathBuf {
        self.source_dir().join("images")
    }

    pub fn public_dir(&self) -> PathBuf {
        self.base_dir.join(&self.config.public_dir)
    }

    /// Directory of the active theme, `themes/<name>`.
    pub fn theme_dir(&self) -> PathBuf {
        self.base_dir.join("themes").join(self.config.theme_name())
    }

    /// Static theme assets served under `/assets`.
    pub fn theme_assets_dir(&self) -> PathBuf {
        self.theme_dir().join("assets")
    }
}
