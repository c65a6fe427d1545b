//! Diary Parser Library
//!
//! Turns Markdown post files into rendered HTML plus metadata.

pub mod markdown;
pub mod syntax;

use std::path::Path;

use diary_core::content::{ParsedContent, is_post_file};
pub use markdown::MarkdownParser;
pub use syntax::SyntaxHighlighter;
use thiserror::Error;

/// Parser errors.
#[derive(Debug, Error)]
pub enum ParserError {
    /// Markdown parsing error.
    #[error("markdown error: {0}")]
    Markdown(#[from] markdown::MarkdownError),

    /// File is not a Markdown post.
    #[error("unsupported file: {0}")]
    Unsupported(String),
}

/// Result type for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Trait for content parsers.
pub trait ContentParser {
    /// Parse content from a string and file path.
    fn parse(&self, content: &str, path: &Path) -> Result<ParsedContent>;
}

impl ContentParser for MarkdownParser {
    fn parse(&self, content: &str, path: &Path) -> Result<ParsedContent> {
        if !is_post_file(path) {
            return Err(ParserError::Unsupported(path.display().to_string()));
        }
        Ok(MarkdownParser::parse(self, content, path)?)
    }
}
