//! The pages of a journal site and the data each one hands to its template.
//!
//! Both the static build and the live server render through [`Page`], so a
//! given set of posts produces the same context in either mode.

use diary_core::{Config, Post};
use serde::Serialize;
use tera::Context;

use crate::{
    archive::ArchiveIndex,
    template::{Result, TemplateError},
};

/// A renderable page.
#[derive(Debug, Clone, Copy)]
pub enum Page<'a> {
    /// Home page listing every post.
    Index { posts: &'a [Post] },
    /// A single post.
    Post(&'a Post),
    /// Posts grouped by year and month.
    Archives(&'a ArchiveIndex),
    About,
}

#[derive(Serialize)]
struct PageMeta<'a> {
    title: &'a str,
}

impl Page<'_> {
    /// Logical template name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Index { .. } => "index",
            Self::Post(_) => "post",
            Self::Archives(_) => "archives",
            Self::About => "about",
        }
    }

    pub fn title<'c>(&'c self, config: &'c Config) -> &'c str {
        match self {
            Self::Index { .. } => config.site_title(),
            Self::Post(post) => &post.title,
            Self::Archives(_) => "Archives",
            Self::About => "About",
        }
    }

    /// Page-specific template data: `page` plus `posts`, `post` or `archives`.
    pub fn context(&self, config: &Config) -> Result<Context> {
        let mut context = Context::new();
        insert(
            &mut context,
            "page",
            &PageMeta {
                title: self.title(config),
            },
        )?;

        match self {
            Self::Index { posts } => {
                insert(&mut context, "posts", posts)?;
                context.insert("debug_panel", &debug_panel(config, posts));
            }
            Self::Post(post) => insert(&mut context, "post", post)?,
            Self::Archives(archives) => insert(&mut context, "archives", archives)?,
            Self::About => {}
        }

        Ok(context)
    }
}

/// Context shared by every page: the merged `config` and `is_server`.
pub fn global_context(config: &Config, is_server: bool) -> Result<Context> {
    let mut context = Context::new();
    insert(&mut context, "config", config)?;
    context.insert("is_server", &is_server);
    Ok(context)
}

/// Summary block shown on the home page when `debug` is enabled, empty otherwise.
pub fn debug_panel(config: &Config, posts: &[Post]) -> String {
    if !config.debug {
        return String::new();
    }

    let mut html = String::from(
        "<div class=\"debug-panel\" style=\"background: #f8f8f8; padding: 15px; margin: 10px 0; border-left: 4px solid #007acc;\">\n",
    );
    html.push_str("<h3 style=\"margin-top:0;\">Debug information (debug mode enabled)</h3>\n");
    html.push_str(&format!("<p>Found <strong>{}</strong> posts</p>\n", posts.len()));

    if let (Some(first), Some(last)) = (posts.first(), posts.last()) {
        html.push_str(&format!(
            "<p>First post: <strong>{}</strong> ({})</p>\n",
            tera::escape_html(&first.title),
            first.date.format("%Y-%m-%d")
        ));
        html.push_str(&format!(
            "<p>Last post: <strong>{}</strong> ({})</p>\n",
            tera::escape_html(&last.title),
            last.date.format("%Y-%m-%d")
        ));
    }

    html.push_str("</div>\n");
    html
}

/// Characters of the plain excerpt shown per post in [`debug_listing`].
const LISTING_EXCERPT_CHARS: usize = 50;

/// Standalone HTML page listing every post, independent of the theme.
pub fn debug_listing(posts: &[Post]) -> String {
    let mut html = String::from(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>Debug - Journal entries</title>
<style>
body { font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; }
.post { border: 1px solid #ccc; margin: 20px 0; padding: 15px; }
.title { font-size: 20px; font-weight: bold; }
.date { color: #666; }
.excerpt { margin: 10px 0; }
</style>
</head>
<body>
<h1>Journal entries (debug mode)</h1>
"#,
    );
    html.push_str(&format!(
        "<p>Found {} entries</p>\n<div class=\"posts\">\n",
        posts.len()
    ));

    if posts.is_empty() {
        html.push_str("<p>No entries found</p>\n");
    }

    for (index, post) in posts.iter().enumerate() {
        let tags = post
            .tags
            .iter()
            .map(|tag| format!("<span class=\"tag\">#{}</span>", tera::escape_html(tag)))
            .collect::<Vec<_>>()
            .join(" ");

        html.push_str(&format!(
            r#"<div class="post">
<div class="post-number">[{number}]</div>
<div class="title">{title}</div>
<div class="date">{date}</div>
<div class="excerpt">{excerpt}</div>
<div class="tags">{tags}</div>
<a href="/post/{id}">Read more</a>
</div>
"#,
            number = index + 1,
            title = tera::escape_html(&post.title),
            date = post.date.format("%Y-%m-%d %H:%M:%S"),
            excerpt = tera::escape_html(&shorten(&post.plain_excerpt, LISTING_EXCERPT_CHARS)),
            id = tera::escape_html(&post.id),
        ));
    }

    html.push_str("</div>\n<p><a href=\"/\">Back to the normal view</a></p>\n");
    html.push_str("</body>\n</html>\n");
    html
}

/// First `max_chars` characters of `text` followed by `...`, or `text` if short enough.
fn shorten(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn insert<T: Serialize + ?Sized>(context: &mut Context, key: &str, value: &T) -> Result<()> {
    context
        .try_insert(key, value)
        .map_err(|e| TemplateError::Context(format!("{key}: {e}")))
}
