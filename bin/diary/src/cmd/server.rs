//! Server command - live preview of the journal

use std::{path::Path, sync::Arc};

use color_eyre::eyre::{Result, WrapErr};
use tokio::net::TcpListener;

use super::load_site;
use crate::server::create_router;

/// Run the preview server until interrupted.
pub async fn run(dir: &Path, ip: &str, port: u16, open: bool) -> Result<()> {
    let site = Arc::new(load_site(dir)?);
    let config = site.config();

    tracing::info!(
        theme = config.theme_name(),
        debug = config.debug,
        "starting preview server"
    );

    let addr = format!("{ip}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    let url = format!("http://{addr}");
    println!("Diary is running at {url}");
    if config.debug {
        println!("Debug listing: {url}/?debug=true");
    }
    println!("Press Ctrl+C to stop");

    if open {
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "Failed to open browser");
        }
    }

    axum::serve(listener, create_router(site))
        .await
        .wrap_err("Server error")?;

    Ok(())
}
