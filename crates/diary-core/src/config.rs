//! Site configuration management.
//!
//! Configuration is assembled from up to three YAML layers:
//!
//! 1. `themes/<theme>/_config.yml` - defaults shipped with the theme
//! 2. `_config.<theme>.yml` - site-level overrides of the theme defaults
//! 3. `_config.yml` - the main site configuration
//!
//! The two theme layers are merged into `theme_config`, which is then merged
//! over the main configuration so theme settings are visible both nested and at
//! the top level.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::{
    error::{CoreError, Result},
    frontmatter::scalar_string,
};

/// Name of the main configuration file, also used inside theme directories.
pub const CONFIG_FILE: &str = "_config.yml";

/// Theme used when the configuration does not name one.
pub const DEFAULT_THEME: &str = "default";

/// Merged site configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Site title, used as the index page title. Numbers and booleans are
    /// taken as text.
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: Option<String>,

    /// Directory holding the content, relative to the site root.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Directory receiving the generated site, relative to the site root.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,

    /// Name of the theme under `themes/`.
    #[serde(default)]
    pub theme: Option<String>,

    /// Verbose diagnostics and the in-page debug panel.
    #[serde(default)]
    pub debug: bool,

    /// Resolved theme layer (theme defaults merged with site overrides).
    #[serde(default)]
    pub theme_config: Mapping,

    /// Every other key, passed through to templates untouched.
    #[serde(flatten)]
    pub extra: Mapping,
}

fn default_source_dir() -> String {
    "source".to_string()
}

fn default_public_dir() -> String {
    "public".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: None,
            source_dir: default_source_dir(),
            public_dir: default_public_dir(),
            theme: None,
            debug: false,
            theme_config: Mapping::new(),
            extra: Mapping::new(),
        }
    }
}

impl Config {
    /// Load and merge every configuration layer found under `base_dir`.
    ///
    /// Missing files count as empty layers. A file that exists but cannot be
    /// read or parsed is a configuration error.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let mut config = read_layer(&base_dir.join(CONFIG_FILE))?;

        if let Some(theme) = declared_theme(&config)? {
            let site_override = read_layer(&base_dir.join(format!("_config.{theme}.yml")))?;
            let theme_default =
                read_layer(&base_dir.join("themes").join(&theme).join(CONFIG_FILE))?;

            let theme_config = merge_mappings(theme_default, site_override);
            tracing::debug!(
                theme = %theme,
                keys = theme_config.len(),
                "resolved theme configuration"
            );

            config.insert(
                Value::from("theme_config"),
                Value::Mapping(theme_config.clone()),
            );
            config = merge_mappings(config, theme_config);
        }

        Self::from_mapping(config)
    }

    /// Build a typed configuration from an already merged mapping.
    pub fn from_mapping(mapping: Mapping) -> Result<Self> {
        serde_yaml::from_value(Value::Mapping(mapping))
            .map_err(|e| CoreError::config_with_source("invalid configuration value", e))
    }

    /// Name of the active theme, falling back to [`DEFAULT_THEME`].
    pub fn theme_name(&self) -> &str {
        self.theme
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_THEME)
    }

    /// Site title, or an empty string when unset.
    pub fn site_title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Mappings present on both sides are merged key by key. Any other value in
/// `overlay` (scalars, sequences, null) replaces the value in `base` wholesale.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            Value::Mapping(merge_mappings(base, overlay))
        }
        (_, overlay) => overlay,
    }
}

/// [`deep_merge`] specialised to mappings, preserving `base` key order.
pub fn merge_mappings(mut base: Mapping, overlay: Mapping) -> Mapping {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => {
                let previous = std::mem::replace(existing, Value::Null);
                *existing = deep_merge(previous, value);
            }
            None => {
                base.insert(key, value);
            }
        }
    }
    base
}

/// Read one YAML layer. Absent or empty files yield an empty mapping.
fn read_layer(path: &Path) -> Result<Mapping> {
    if !path.exists() {
        tracing::trace!(path = %path.display(), "config layer not present");
        return Ok(Mapping::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        CoreError::config_with_source(format!("Failed to read config file: {}", path.display()), e)
    })?;

    let value: Value = serde_yaml::from_str(&content).map_err(|e| {
        CoreError::config_with_source(
            format!("Failed to parse config file: {}", path.display()),
            e,
        )
    })?;

    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(CoreError::config(format!(
            "{} must contain a mapping at the top level",
            path.display()
        ))),
    }
}

fn declared_theme(config: &Mapping) -> Result<Option<String>> {
    match config.get("theme") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) if name.is_empty() => Ok(None),
        Some(Value::String(name)) => Ok(Some(name.clone())),
        Some(other) => Err(CoreError::config(format!(
            "theme must be a string, found {other:?}"
        ))),
    }
}
