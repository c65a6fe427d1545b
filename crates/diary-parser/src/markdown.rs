//! Markdown parser using pulldown-cmark.

use std::{path::Path, sync::LazyLock};

use diary_core::{content::ParsedContent, frontmatter::parse_frontmatter};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;
use thiserror::Error;

use crate::syntax::SyntaxHighlighter;

/// Marker separating the excerpt from the rest of a post.
pub const MORE_MARKER: &str = "<!-- more -->";

static HEADING_MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#+\s+").expect("static regex"));
static EMPHASIS_MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*|\*|~~|_").expect("static regex"));
static LINKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]\(.*?\)").expect("static regex"));
static CODE_MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`{1,3}(.*?)`{1,3}").expect("static regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Markdown parsing errors.
#[derive(Debug, Error)]
pub enum MarkdownError {
    /// Failed to parse frontmatter.
    #[error("frontmatter error: {0}")]
    Frontmatter(#[from] diary_core::error::CoreError),
}

/// Result type for markdown operations.
pub type Result<T> = std::result::Result<T, MarkdownError>;

/// Markdown parser with syntax highlighting support.
#[derive(Debug)]
pub struct MarkdownParser {
    highlighter: SyntaxHighlighter,
    options: Options,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

struct CodeBlock {
    lang: Option<String>,
    code: String,
}

impl MarkdownParser {
    /// Create a new markdown parser with GitHub-flavoured extensions enabled.
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_GFM);

        Self {
            highlighter: SyntaxHighlighter::default(),
            options,
        }
    }

    /// Parse a post file: frontmatter, body HTML and excerpt.
    ///
    /// Without a frontmatter block the excerpt fields stay empty.
    pub fn parse(&self, content: &str, path: &Path) -> Result<ParsedContent> {
        let (frontmatter, body) = parse_frontmatter(content, path)?;

        let html = self.render(body);
        let (excerpt_html, plain_excerpt) = if frontmatter.is_some() {
            let excerpt = excerpt_source(body);
            (self.render(excerpt), plain_text_excerpt(excerpt))
        } else {
            (String::new(), String::new())
        };

        Ok(ParsedContent {
            frontmatter,
            html,
            excerpt_html,
            plain_excerpt,
        })
    }

    /// Render markdown to HTML, highlighting fenced code blocks.
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut events = Vec::new();
        let mut code_block: Option<CodeBlock> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(str::to_string)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(CodeBlock {
                        lang,
                        code: String::new(),
                    });
                }

                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = code_block.take() {
                        let highlighted = self
                            .highlighter
                            .highlight(&block.code, block.lang.as_deref());
                        events.push(Event::Html(highlighted.into()));
                    }
                }

                Event::Text(text) => match code_block.as_mut() {
                    Some(block) => block.code.push_str(&text),
                    None => events.push(Event::Text(text)),
                },

                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }
}

/// Markdown before the first more marker, or the whole body without one.
pub fn excerpt_source(body: &str) -> &str {
    body.split_once(MORE_MARKER)
        .map_or(body, |(excerpt, _)| excerpt)
}

/// Strip common markdown markup from an excerpt, collapsing whitespace.
pub fn plain_text_excerpt(markdown: &str) -> String {
    let text = HEADING_MARKS.replace_all(markdown, "");
    let text = EMPHASIS_MARKS.replace_all(&text, "");
    let text = LINKS.replace_all(&text, "$1");
    let text = CODE_MARKS.replace_all(&text, "$1");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_markdown() {
        let parser = MarkdownParser::new();
        let content = r#"---
title: "Test Post"
---

# Hello World

This is a test."#;

        let result = parser.parse(content, Path::new("test.md")).unwrap();

        let fm = result.frontmatter.expect("frontmatter");
        assert_eq!(fm.title(), Some("Test Post"));
        assert!(result.html.contains("<h1>Hello World</h1>"));
        assert!(result.html.contains("<p>This is a test.</p>"));
        // no marker: excerpt is the whole body
        assert_eq!(result.excerpt_html, result.html);
        assert_eq!(result.plain_excerpt, "Hello World This is a test.");
    }

    #[test]
    fn test_excerpt_before_more_marker() {
        let parser = MarkdownParser::new();
        let content = "---\ntitle: x\n---\nFirst **bold** part.\n<!-- more -->\nHidden rest.";

        let result = parser.parse(content, Path::new("x.md")).unwrap();

        assert!(result.excerpt_html.contains("<strong>bold</strong>"));
        assert!(!result.excerpt_html.contains("Hidden"));
        assert!(result.html.contains("Hidden rest."));
        assert_eq!(result.plain_excerpt, "First bold part.");
    }

    #[test]
    fn test_no_frontmatter_has_empty_excerpt() {
        let parser = MarkdownParser::new();
        let content = "# Just Content\n\nNo frontmatter here.";
        let result = parser.parse(content, Path::new("test.md")).unwrap();

        assert!(result.frontmatter.is_none());
        assert!(result.html.contains("Just Content"));
        assert!(result.excerpt_html.is_empty());
        assert!(result.plain_excerpt.is_empty());
    }

    #[test]
    fn test_malformed_frontmatter_is_error() {
        let parser = MarkdownParser::new();
        let result = parser.parse("---\ntitle: [oops\n---\nbody", Path::new("bad.md"));
        assert!(matches!(result, Err(MarkdownError::Frontmatter(_))));
    }

    #[test]
    fn test_render_code_block() {
        let parser = MarkdownParser::new();
        let html = parser.render("```rust\nfn main() {\n    println!(\"Hello\");\n}\n```");

        assert!(html.contains("<pre"));
        assert!(html.contains("main"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_render_code_block_unknown_language() {
        let parser = MarkdownParser::new();
        let html = parser.render("```nosuchlang\nlet x = 1;\n```\n\nafter");

        assert!(html.contains("let x = 1;"));
        assert!(html.contains("<p>after</p>"));
    }

    #[test]
    fn test_render_table() {
        let parser = MarkdownParser::new();
        let html = parser.render(
            r#"| Header 1 | Header 2 |
|----------|----------|
| Cell 1   | Cell 2   |"#,
        );

        assert!(html.contains("<table>"));
        assert!(html.contains("<thead>"));
        assert!(html.contains("<td>Cell 1</td>"));
    }

    #[test]
    fn test_render_task_list() {
        let parser = MarkdownParser::new();
        let html = parser.render("- [x] Done\n- [ ] Not done");

        assert!(html.contains("checkbox"));
        assert!(html.contains("checked"));
    }

    #[test]
    fn test_render_escapes_text() {
        let parser = MarkdownParser::new();
        let html = parser.render("a < b & c");
        assert_eq!(html, "<p>a &lt; b &amp; c</p>\n");
    }

    #[test]
    fn test_excerpt_source() {
        assert_eq!(excerpt_source("intro<!-- more -->rest"), "intro");
        assert_eq!(excerpt_source("a<!-- more -->b<!-- more -->c"), "a");
        assert_eq!(excerpt_source("no marker"), "no marker");
    }

    #[test]
    fn test_plain_text_excerpt() {
        assert_eq!(plain_text_excerpt("## Morning\n\nWoke up *early*."), "Morning Woke up early.");
        assert_eq!(
            plain_text_excerpt("See [my notes](http://x.y/z) and `code` here"),
            "See my notes and code here"
        );
        assert_eq!(plain_text_excerpt("~~struck~~ __under__"), "struck under");
        assert_eq!(plain_text_excerpt("  \n\t "), "");
    }
}
