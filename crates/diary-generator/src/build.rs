//! Build orchestration.
//!
//! Renders the home page, every post, the archives and the about page into the
//! public directory.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use diary_core::Site;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    archive::ArchiveIndex,
    collector::PostCollector,
    page::{Page, global_context},
    template::{TemplateError, ThemeRenderer},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Theme templates could not be loaded.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// The output directory contains the site root or its sources.
    #[error("refusing to clean {0}: it contains the site sources")]
    UnsafeOutputDir(PathBuf),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of posts collected.
    pub posts: usize,

    /// Number of pages written.
    pub pages: usize,

    /// Output paths of pages that failed to render.
    pub failed: Vec<PathBuf>,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

impl BuildStats {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Site builder that writes the static site.
#[derive(Debug)]
pub struct Builder<'a> {
    site: &'a Site,
    output_dir: PathBuf,
}

impl<'a> Builder<'a> {
    /// Create a builder writing to the site's public directory.
    #[must_use]
    pub fn new(site: &'a Site) -> Self {
        Self {
            site,
            output_dir: site.public_dir(),
        }
    }

    /// Write to `dir` instead of the configured public directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Execute the full build.
    ///
    /// A page whose template fails is logged and recorded in
    /// [`BuildStats::failed`]; the remaining pages are still written.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();
        let config = self.site.config();

        info!(
            source = %self.site.source_dir().display(),
            output = %self.output_dir.display(),
            theme = config.theme_name(),
            "starting build"
        );

        self.clean_output()?;

        let posts = PostCollector::new(self.site).collect();
        stats.posts = posts.len();
        let archives = ArchiveIndex::build(&posts);

        let renderer =
            ThemeRenderer::new(&self.site.theme_dir(), global_context(config, false)?)?;

        let mut pages = Vec::with_capacity(posts.len() + 3);
        pages.push((Page::Index { posts: &posts }, PathBuf::from("index.html")));
        pages.extend(posts.iter().map(|post| {
            let path = Path::new("post").join(format!("{}.html", post.id));
            (Page::Post(post), path)
        }));
        pages.push((
            Page::Archives(&archives),
            Path::new("archives").join("index.html"),
        ));
        pages.push((Page::About, Path::new("about").join("index.html")));

        for (page, relative) in pages {
            let output_path = self.output_dir.join(&relative);
            match self.write_page(&renderer, page, &output_path) {
                Ok(()) => stats.pages += 1,
                Err(e) => {
                    error!(
                        page = page.name(),
                        path = %relative.display(),
                        error = %e,
                        "failed to render page"
                    );
                    stats.failed.push(relative);
                }
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            posts = stats.posts,
            pages = stats.pages,
            failed = stats.failed.len(),
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    fn write_page(
        &self,
        renderer: &ThemeRenderer,
        page: Page<'_>,
        output_path: &Path,
    ) -> Result<()> {
        let html = renderer.render(page.name(), page.context(self.site.config())?)?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, html)?;

        debug!(path = %output_path.display(), "wrote page");
        Ok(())
    }

    /// Empty the output directory, creating it if needed.
    ///
    /// Fails without deleting anything when the output directory is the site
    /// root, the source directory, or one of their ancestors.
    fn clean_output(&self) -> Result<()> {
        let output = resolved(&self.output_dir);
        if resolved(self.site.base_dir()).starts_with(&output)
            || resolved(&self.site.source_dir()).starts_with(&output)
        {
            return Err(BuildError::UnsafeOutputDir(self.output_dir.clone()));
        }

        if self.output_dir.exists() {
            debug!(dir = %self.output_dir.display(), "cleaning output directory");
            fs::remove_dir_all(&self.output_dir)?;
        }
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }
}

/// Canonical form of `path` when it exists, the path itself otherwise.
fn resolved(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
