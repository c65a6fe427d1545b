//! Build command - generates the static site

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr, bail};
use diary_generator::{BuildStats, Builder};

use super::load_site;

/// Run the build command.
///
/// Renders every page of the site under `dir` into its public directory. Fails
/// when any page could not be rendered, after writing all the others.
pub fn run(dir: &Path) -> Result<BuildStats> {
    let start = Instant::now();
    tracing::info!(?dir, "Starting build");

    let site = load_site(dir)?;
    let stats = Builder::new(&site).build().wrap_err("Build failed")?;

    let duration = start.elapsed();

    println!();
    println!("  Posts:      {}", stats.posts);
    println!("  Pages:      {}", stats.pages);
    println!("  Failed:     {}", stats.failed.len());
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Output:     {}", site.public_dir().display());
    println!();

    if !stats.is_success() {
        for path in &stats.failed {
            eprintln!("  ✗ {}", path.display());
        }
        bail!("{} page(s) failed to render", stats.failed.len());
    }

    println!("  Build completed successfully!");
    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(stats)
}
