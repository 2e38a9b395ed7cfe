//! SessionCore: the command loop between front ends and the `Session`.
//!
//! The TUI and the HTTP API send `CoreEvent`s here. Each command runs as its
//! own task so a slow discovery or search never blocks the next key press;
//! ordering between them is resolved inside `Session` by generation counters.
//!
//! A 250ms tick expires notifications.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use veil_core::protocol::Command;
use veil_core::render::PlayerId;
use veil_core::session::Session;

#[derive(Debug)]
pub enum CoreEvent {
    /// A command from the TUI or HTTP API.
    Command(Command),
    Shutdown,
}

pub struct SessionCore {
    session: Arc<Session>,
}

impl SessionCore {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub async fn run(self, mut event_rx: mpsc::Receiver<CoreEvent>) -> anyhow::Result<()> {
        info!("SessionCore: starting event loop");

        let mut prune = tokio::time::interval(Duration::from_millis(250));
        prune.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                evt = event_rx.recv() => match evt {
                    None => {
                        info!("SessionCore: event channel closed, shutting down");
                        break;
                    }
                    Some(CoreEvent::Shutdown) => {
                        info!("SessionCore: shutdown requested");
                        break;
                    }
                    Some(CoreEvent::Command(cmd)) => {
                        debug!("SessionCore: command {:?}", cmd);
                        let session = self.session.clone();
                        tokio::spawn(async move { handle_command(&session, cmd).await });
                    }
                },
                _ = prune.tick() => {
                    self.session.prune_notifications().await;
                }
            }
        }
        Ok(())
    }
}

/// Run one command to completion. Failures are already surfaced to the user
/// as notifications by `Session`; here they are only logged.
pub async fn handle_command(session: &Session, cmd: Command) {
    match cmd {
        Command::Discover => {
            session.discover().await;
        }
        Command::SelectBackend { choice } => {
            if let Err(e) = session.select_backend_named(&choice).await {
                warn!("select backend: {}", e);
            }
        }
        Command::Launch { input } => {
            if let Err(e) = session.launch_video(&input).await {
                debug!("launch: {}", e);
            }
        }
        Command::RemovePlayer { id } => {
            if !session.remove_player(PlayerId(id)).await {
                debug!("remove: no player {}", id);
            }
        }
        Command::Search { query } => {
            if let Err(e) = session.search(&query).await {
                debug!("search {:?}: {}", query, e);
            }
        }
        Command::OpenResult { index } => {
            if let Err(e) = session.open_result(index).await {
                warn!("open result {}: {}", index, e);
            }
        }
        Command::SwitchView { view } => {
            if let Err(e) = session.switch_view_named(&view).await {
                warn!("switch view: {}", e);
            }
        }
        Command::ToggleXFrame => {
            session.toggle_xframe().await;
        }
        Command::ToggleOptimized => {
            session.toggle_optimized().await;
        }
    }
}
