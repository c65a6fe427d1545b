//! Command implementations.

pub mod build;
pub mod new;
pub mod server;

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, bail};
use diary_core::Site;

/// Load the site rooted at `dir`, refusing directories without `_config.yml`.
pub fn load_site(dir: &Path) -> Result<Site> {
    if !Site::is_site_root(dir) {
        bail!(
            "{} is not a diary site (no _config.yml found)",
            dir.display()
        );
    }

    let site = Site::load(dir).wrap_err("Failed to load configuration")?;
    tracing::debug!(config = ?site.config(), "Loaded configuration");
    Ok(site)
}
