// mechtag entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the API client, art fetcher, and access-code store
// 4. Create mpsc channels
// 5. Spawn the app orchestrator task
// 6. Run the TUI event loop (blocking until the user quits)
// 7. Cleanup on exit

use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use mechtag::api::ApiClient;
use mechtag::app;
use mechtag::art::{ArtFetcher, ScryfallLookup};
use mechtag::config;
use mechtag::store::AccessCodeStore;
use mechtag::tui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("mechtag starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: server={}, art endpoint={}",
        config.server.base_url, config.art.endpoint
    );

    // 3. Build the clients and the access-code store
    let api = ApiClient::new(
        &config.server.base_url,
        Duration::from_secs(config.server.timeout_secs),
    )
    .context("failed to build HTTP client")?;

    let art = ArtFetcher::spawn(
        ScryfallLookup::new(config.art.endpoint.clone()),
        Duration::from_millis(config.art.request_delay_ms),
    );

    let store = AccessCodeStore::open_default().context("failed to open access-code store")?;
    let saved_access_code = store.load();
    if saved_access_code.is_some() {
        info!("Loaded persisted access code");
    }

    // 4. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    // 5. Spawn the app orchestrator task
    let state = app::AppState::new(api, art, store);
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 6. Run the TUI event loop (blocking until the user quits)
    info!("Application ready");
    if let Err(e) = tui::run(ui_rx, cmd_tx, saved_access_code).await {
        error!("TUI error: {}", e);
    }

    // 7. Cleanup: wait for the app task to finish (with timeout)
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("mechtag shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by
/// the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("mechtag.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mechtag=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
