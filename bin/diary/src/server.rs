//! Preview server that renders pages on every request.
//!
//! Posts are discovered and parsed again for each request and templates are
//! reloaded from the theme, so edits show up on the next page load.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use diary_core::Site;
use diary_generator::{
    ArchiveIndex, Page, PostCollector, TemplateError, ThemeRenderer, debug_listing,
    global_context,
};
use serde::Deserialize;
use tower_http::services::ServeDir;

/// Errors turned into HTTP responses.
#[derive(Debug)]
enum ServerError {
    /// No post with the requested id.
    PostNotFound,
    /// The post file exists but could not be parsed.
    PostUnreadable(String),
    /// No template resolved, or rendering failed.
    Template(TemplateError),
    /// The rendering task panicked or was cancelled.
    Task(tokio::task::JoinError),
}

impl From<TemplateError> for ServerError {
    fn from(err: TemplateError) -> Self {
        Self::Template(err)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            Self::PostNotFound => {
                (StatusCode::NOT_FOUND, Html("<h1>Post not found</h1>")).into_response()
            }
            Self::PostUnreadable(id) => {
                tracing::error!(id = %id, "post could not be parsed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>Post could not be parsed</h1>"),
                )
                    .into_response()
            }
            Self::Template(err) => {
                tracing::error!(error = %err, "template rendering failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>Template rendering failed</h1>"),
                )
                    .into_response()
            }
            Self::Task(err) => {
                tracing::error!(error = %err, "render task failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Default, Deserialize)]
struct IndexQuery {
    debug: Option<String>,
}

/// Create the preview server router.
pub fn create_router(site: Arc<Site>) -> Router {
    let assets = ServeDir::new(site.theme_assets_dir());
    let images = ServeDir::new(site.images_dir());

    Router::new()
        .route("/", get(index_handler))
        .route("/post/{id}", get(post_handler))
        .route("/archives", get(archives_handler))
        .route("/about", get(about_handler))
        .nest_service("/assets", assets)
        .nest_service("/images", images)
        .fallback(not_found_handler)
        .with_state(site)
}

async fn index_handler(
    State(site): State<Arc<Site>>,
    Query(query): Query<IndexQuery>,
) -> Response {
    let listing = query.debug.as_deref() == Some("true");

    blocking(site, move |site| {
        let posts = PostCollector::new(site).collect();
        if site.config().debug {
            tracing::info!(posts = posts.len(), listing, "rendering index");
        }

        if listing {
            return Ok(Html(debug_listing(&posts)).into_response());
        }
        render(site, Page::Index { posts: &posts })
    })
    .await
}

async fn post_handler(State(site): State<Arc<Site>>, Path(id): Path<String>) -> Response {
    blocking(site, move |site| {
        let collector = PostCollector::new(site);
        let path = collector.post_path(&id).ok_or(ServerError::PostNotFound)?;
        let post = collector
            .parse_post(&path)
            .ok_or_else(|| ServerError::PostUnreadable(id.clone()))?;

        if site.config().debug {
            tracing::info!(id = %post.id, title = %post.title, "rendering post");
        }
        render(site, Page::Post(&post))
    })
    .await
}

async fn archives_handler(State(site): State<Arc<Site>>) -> Response {
    blocking(site, |site| {
        let posts = PostCollector::new(site).collect();
        let archives = ArchiveIndex::build(&posts);
        render(site, Page::Archives(&archives))
    })
    .await
}

async fn about_handler(State(site): State<Arc<Site>>) -> Response {
    blocking(site, |site| render(site, Page::About)).await
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html("<h1>Page not found</h1>"))
}

/// Render `page` with a freshly loaded theme.
fn render(site: &Site, page: Page<'_>) -> Result<Response> {
    let config = site.config();
    let renderer = ThemeRenderer::new(&site.theme_dir(), global_context(config, true)?)?;
    let html = renderer.render(page.name(), page.context(config)?)?;
    Ok(Html(html).into_response())
}

/// Run the synchronous pipeline off the async runtime.
async fn blocking<F>(site: Arc<Site>, f: F) -> Response
where
    F: FnOnce(&Site) -> Result<Response> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&site))
        .await
        .unwrap_or_else(|e| Err(ServerError::Task(e)))
        .unwrap_or_else(|e| e.into_response())
}
