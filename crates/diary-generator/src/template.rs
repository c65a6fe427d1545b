//! Theme template resolution and rendering.
//!
//! Templates live in `<theme>/layout/*.html` and are rendered with Tera. A page
//! asks for a logical template name; when the theme lacks it, `page` and then
//! `index` are tried before giving up.

use std::{
    error::Error as _,
    fs,
    path::{Path, PathBuf},
};

use tera::{Context, Tera};
use thiserror::Error;
use tracing::debug;

/// Directory under the theme holding templates.
pub const LAYOUT_DIR: &str = "layout";

/// Extension of template files.
pub const TEMPLATE_EXTENSION: &str = "html";

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No candidate template exists in the theme.
    #[error("no template for '{name}' in {layout_dir} (tried {name}, page, index)")]
    NotFound { name: String, layout_dir: PathBuf },

    /// Loading the theme templates failed.
    #[error("failed to load templates from {layout_dir}: {message}")]
    Load { layout_dir: PathBuf, message: String },

    /// Page data could not be turned into a template context.
    #[error("invalid template context: {0}")]
    Context(String),

    /// Rendering the resolved template failed.
    #[error("failed to render '{template}': {message}")]
    Render { template: String, message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Renders pages with the templates of one theme.
#[derive(Debug)]
pub struct ThemeRenderer {
    tera: Tera,
    layout_dir: PathBuf,
    globals: Context,
}

impl ThemeRenderer {
    /// Load every template under `<theme_dir>/layout`.
    ///
    /// `globals` is the base context of every render. A theme without a layout
    /// directory loads fine and fails at render time.
    pub fn new(theme_dir: &Path, globals: Context) -> Result<Self> {
        let layout_dir = theme_dir.join(LAYOUT_DIR);

        let files = template_files(&layout_dir)?;
        debug!(
            dir = %layout_dir.display(),
            count = files.len(),
            "loading templates"
        );

        let mut tera = Tera::default();
        tera.add_template_files(files)
            .map_err(|e| TemplateError::Load {
                layout_dir: layout_dir.clone(),
                message: error_chain(&e),
            })?;

        Ok(Self {
            tera,
            layout_dir,
            globals,
        })
    }

    /// Resolve a logical page name to the template file that will render it.
    ///
    /// Candidates are `name`, `page`, `index`; the first one present on disk wins.
    pub fn resolve(&self, name: &str) -> Result<String> {
        [name, "page", "index"]
            .into_iter()
            .map(|candidate| format!("{candidate}.{TEMPLATE_EXTENSION}"))
            .find(|file| self.layout_dir.join(file).is_file())
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
                layout_dir: self.layout_dir.clone(),
            })
    }

    /// Render the page `name` with `data` layered over the global context.
    ///
    /// Keys in `data` replace global keys of the same name.
    pub fn render(&self, name: &str, data: Context) -> Result<String> {
        let template = self.resolve(name)?;
        if template != format!("{name}.{TEMPLATE_EXTENSION}") {
            debug!(page = name, template = %template, "using fallback template");
        }

        let mut context = self.globals.clone();
        context.extend(data);

        self.tera
            .render(&template, &context)
            .map_err(|e| TemplateError::Render {
                template,
                message: error_chain(&e),
            })
    }

    pub fn layout_dir(&self) -> &Path {
        &self.layout_dir
    }
}

/// Template files under `dir`, named by their `/`-separated relative path.
fn template_files(dir: &Path) -> Result<Vec<(PathBuf, Option<String>)>> {
    let mut files = Vec::new();
    if dir.is_dir() {
        walk_templates(dir, dir, &mut files)?;
    }
    Ok(files)
}

fn walk_templates(
    root: &Path,
    dir: &Path,
    files: &mut Vec<(PathBuf, Option<String>)>,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_templates(root, &path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXTENSION) {
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push((path, Some(name)));
        }
    }
    Ok(())
}

/// Flatten a Tera error and its causes into one line.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
