// BuildBidz terminal client entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config (copying defaults on first start)
// 3. Open the local store
// 4. Build the API client
// 5. Create mpsc channels and the application state
// 6. Spawn the orchestrator task
// 7. Run the TUI until the user quits
// 8. Cleanup on exit

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use buildbidz_app::app;
use buildbidz_core::api::ApiClient;
use buildbidz_core::config;
use buildbidz_core::db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("BuildBidz client starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: backend={}{}, chat poll {}s, notification poll {}s",
        config.server.base_url,
        config.server.api_prefix,
        config.polling.chat_interval_secs,
        config.polling.notification_interval_secs
    );

    // 3. Open the local store
    let db_path = config.db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create data directory {}", parent.display()))?;
    }
    let db = Database::open(&db_path.to_string_lossy()).context("failed to open database")?;
    info!("Database opened at {}", db_path.display());

    // 4. API client
    let api = Arc::new(ApiClient::from_config(&config.server).context("failed to build API client")?);

    // 5. Channels and state
    let (poll_tx, poll_rx) = mpsc::channel(64);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let max_upload_bytes = config.uploads.max_file_size_bytes();
    let app_state = app::AppState::new(config, api, db, poll_tx);

    // 6. Spawn the orchestrator
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, poll_rx, ui_tx, app_state).await {
            error!("Application loop error: {e:#}");
        }
    });

    // 7. Run the TUI; blocks until the user quits.
    if let Err(e) = buildbidz_tui::run(ui_rx, cmd_tx, max_upload_bytes).await {
        error!("TUI error: {e:#}");
    }

    // 8. Wait for the orchestrator to stop its pollers
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("BuildBidz client shut down cleanly");
    Ok(())
}

/// Log to a file; the terminal belongs to the TUI.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("buildbidz.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("buildbidz=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
