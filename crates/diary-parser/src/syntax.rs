//! Syntax highlighting for fenced code blocks.

use std::sync::LazyLock;

use syntect::{highlighting::ThemeSet, html::highlighted_html_for_string, parsing::SyntaxSet};

/// Theme used when none is named.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

// Loaded once per process.
static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Syntax highlighter using syntect.
#[derive(Debug, Clone)]
pub struct SyntaxHighlighter {
    theme: String,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

impl SyntaxHighlighter {
    /// Create a highlighter using the named syntect theme.
    ///
    /// Unknown names fall back to the first bundled theme when highlighting.
    pub fn new(theme: &str) -> Self {
        Self {
            theme: theme.to_string(),
        }
    }

    /// Highlight code with the given language.
    ///
    /// Missing or unrecognized languages are highlighted as plain text.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let syntaxes = &*SYNTAXES;
        let syntax = lang
            .filter(|l| !l.is_empty())
            .and_then(|l| syntaxes.find_syntax_by_token(l))
            .unwrap_or_else(|| syntaxes.find_syntax_plain_text());

        let theme = THEMES
            .themes
            .get(&self.theme)
            .or_else(|| THEMES.themes.values().next());

        let Some(theme) = theme else {
            return fallback_highlight(code, lang);
        };

        highlighted_html_for_string(code, syntaxes, syntax, theme)
            .unwrap_or_else(|_| fallback_highlight(code, lang))
    }
}

/// Unstyled code block used when syntect cannot render.
fn fallback_highlight(code: &str, lang: Option<&str>) -> String {
    let escaped = html_escape(code);
    let lang_class = lang
        .map(|l| format!(" class=\"language-{}\"", html_escape(l)))
        .unwrap_or_default();
    format!("<pre><code{lang_class}>{escaped}</code></pre>")
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
