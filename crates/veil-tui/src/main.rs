mod action;
mod app;
mod component;
mod components;
mod core;
mod http;
mod theme;
mod widgets;

use std::sync::Arc;

use tokio::sync::mpsc;
use veil_core::config::Config;
use veil_core::prefs::PrefStore;
use veil_core::protocol::Command;
use veil_core::session::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = veil_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("veil.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG overrides; HTTP client internals are noisy at debug.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("veil log: {}", log_path.display());
    tracing::info!("veil starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("config: {}; using defaults", e);
            Config::default()
        }
    };

    let prefs = PrefStore::load(config.paths.prefs_file.clone());
    let session = Arc::new(Session::new(&config, prefs)?);

    // ── Command channel (TUI/HTTP → SessionCore) ─────────────────────────────
    let (event_tx, event_rx) = mpsc::channel::<core::CoreEvent>(1024);

    if config.http.enabled {
        http::start_server(
            config.http.bind_address.clone(),
            config.http.port,
            session.clone(),
            event_tx.clone(),
        );
    }

    let session_core = core::SessionCore::new(session.clone());
    tokio::spawn(async move {
        if let Err(e) = session_core.run(event_rx).await {
            tracing::error!("SessionCore exited with error: {}", e);
        }
    });

    // Discovery starts as soon as the UI is up; it never blocks input.
    event_tx.send(core::CoreEvent::Command(Command::Discover)).await?;

    let initial = session.snapshot().await;
    app::App::new(session, event_tx, initial).run().await?;

    Ok(())
}
