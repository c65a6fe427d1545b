//! Post discovery and parsing.
//!
//! Lists the Markdown files in the posts directory, parses each into a [`Post`]
//! and orders the result newest first.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use diary_core::{
    CoreError, Post, Site,
    content::{POST_EXTENSION, is_post_file},
};
use diary_parser::{ContentParser, MarkdownParser, ParserError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while turning one file into a post.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Frontmatter or date error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Parser error, including non-Markdown files.
    #[error(transparent)]
    Parser(#[from] ParserError),
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Discovers and parses posts under `<source_dir>/_posts`.
#[derive(Debug)]
pub struct PostCollector {
    posts_dir: PathBuf,
    debug: bool,
    parser: MarkdownParser,
}

impl PostCollector {
    /// Create a collector for the posts directory of `site`.
    #[must_use]
    pub fn new(site: &Site) -> Self {
        Self {
            posts_dir: site.posts_dir(),
            debug: site.config().debug,
            parser: MarkdownParser::new(),
        }
    }

    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    /// Collect every parseable post, newest first.
    ///
    /// A missing posts directory yields no posts. Files that fail to parse are
    /// logged and skipped. Posts with equal dates keep directory order.
    pub fn collect(&self) -> Vec<Post> {
        let files = match self.find_post_files() {
            Ok(files) => files,
            Err(e) => {
                warn!(dir = %self.posts_dir.display(), error = %e, "cannot list posts directory");
                return Vec::new();
            }
        };

        let mut posts: Vec<Post> = files.iter().filter_map(|path| self.parse_post(path)).collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        info!(
            files = files.len(),
            posts = posts.len(),
            "loaded posts"
        );

        if self.debug {
            for (index, post) in posts.iter().enumerate() {
                debug!(
                    index = index + 1,
                    id = %post.id,
                    title = %post.title,
                    date = %post.date.format("%Y-%m-%d"),
                    "post"
                );
            }
        }

        posts
    }

    /// Parse a single post file.
    ///
    /// Returns `None` when the file cannot be read or parsed; the cause is logged.
    pub fn parse_post(&self, path: &Path) -> Option<Post> {
        match self.try_parse_post(path) {
            Ok(post) => Some(post),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse post");
                None
            }
        }
    }

    /// Path of the post file for `id`, if it exists.
    ///
    /// Ids that could escape the posts directory never resolve.
    pub fn post_path(&self, id: &str) -> Option<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return None;
        }

        let path = self.posts_dir.join(format!("{id}.{POST_EXTENSION}"));
        path.is_file().then_some(path)
    }

    fn try_parse_post(&self, path: &Path) -> Result<Post> {
        debug!(path = %path.display(), "parsing post");

        let content = fs::read_to_string(path)?;
        let parsed = ContentParser::parse(&self.parser, &content, path)?;

        Ok(Post::from_parsed(parsed, path, fallback_date(path))?)
    }

    /// Markdown files directly inside the posts directory, in listing order.
    fn find_post_files(&self) -> Result<Vec<PathBuf>> {
        if !self.posts_dir.is_dir() {
            debug!(dir = %self.posts_dir.display(), "posts directory does not exist");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.posts_dir)? {
            let path = entry?.path();
            if path.is_file() && is_post_file(&path) {
                files.push(path);
            }
        }

        Ok(files)
    }
}

/// Date used for posts that do not declare one: the file's modification time.
fn fallback_date(path: &Path) -> DateTime<Local> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now())
}
