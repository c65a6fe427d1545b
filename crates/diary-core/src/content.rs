//! Content types and structures.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local};
use serde::Serialize;

use crate::{
    error::{CoreError, Result},
    frontmatter::Frontmatter,
};

/// Extension of post source files.
pub const POST_EXTENSION: &str = "md";

/// Parsed content with metadata and rendered HTML.
#[derive(Debug, Clone)]
pub struct ParsedContent {
    /// Parsed frontmatter metadata, `None` when the file has no frontmatter block.
    pub frontmatter: Option<Frontmatter>,

    /// Rendered HTML of the whole body.
    pub html: String,

    /// Rendered HTML of the excerpt.
    pub excerpt_html: String,

    /// Plain-text rendition of the excerpt.
    pub plain_excerpt: String,
}

/// A single journal entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// File name without the `.md` extension, unique within the posts directory.
    pub id: String,

    /// Title from frontmatter, or the id.
    pub title: String,

    /// Publication date.
    pub date: DateTime<Local>,

    pub tags: Vec<String>,

    pub categories: Vec<String>,

    /// Rendered HTML of the full body.
    pub content: String,

    /// Rendered HTML of the text before the more marker.
    pub excerpt: String,

    /// Excerpt with markup stripped.
    pub plain_excerpt: String,

    #[serde(skip)]
    pub source_path: PathBuf,
}

impl Post {
    /// Create a post from parsed content.
    ///
    /// `fallback_date` is used when the frontmatter carries no date, or when
    /// there is no frontmatter at all.
    pub fn from_parsed(
        content: ParsedContent,
        path: &Path,
        fallback_date: DateTime<Local>,
    ) -> Result<Self> {
        let id = post_id(path).ok_or_else(|| {
            CoreError::frontmatter(path, "file name is not a valid post identifier")
        })?;

        let Some(fm) = content.frontmatter else {
            return Ok(Self {
                title: id.clone(),
                id,
                date: fallback_date,
                tags: Vec::new(),
                categories: Vec::new(),
                content: content.html,
                excerpt: String::new(),
                plain_excerpt: String::new(),
                source_path: path.to_path_buf(),
            });
        };

        let date = fm.parsed_date(path)?.unwrap_or(fallback_date);
        let title = fm.title().map_or_else(|| id.clone(), str::to_string);

        Ok(Self {
            id,
            title,
            date,
            tags: fm.tags,
            categories: fm.categories,
            content: content.html,
            excerpt: content.excerpt_html,
            plain_excerpt: content.plain_excerpt,
            source_path: path.to_path_buf(),
        })
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Month of publication, 1-12.
    pub fn month(&self) -> u32 {
        self.date.month()
    }
}

/// Derive a post id from its file path.
pub fn post_id(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Whether `path` names a post source file.
pub fn is_post_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(POST_EXTENSION)
}
