//! Binary entry point that glues the catalog client to the TUI: resolve the
//! configuration, start logging, build the HTTP-backed client, and drive the
//! Ratatui event loop until the user exits.
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;
use tv_show_browser::{logging, run_app, App, CatalogClient, Config, HttpCatalog};

/// Everything runs on one thread; fetches are tasks on the same runtime.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(&config)?;
    info!(api_url = %config.api_url, "starting");

    let source = Arc::new(HttpCatalog::from_config(&config)?);
    let catalog = Arc::new(CatalogClient::new(source));
    let (fetched_tx, fetched_rx) = mpsc::unbounded_channel();

    let mut app = App::new(catalog, fetched_tx);
    run_app(&mut app, fetched_rx).await
}
