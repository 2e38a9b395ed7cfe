//! Session: the single owner of all mutable front-end state.
//!
//! Shared as `Arc<Session>` between the TUI, the HTTP API and background
//! tasks. Every operation snapshots the active backend when it starts and
//! keeps using that snapshot even if the backend changes mid-flight. The
//! state lock is never held across a network await.
//!
//! After each mutation `rev` is bumped and `SessionEvent::StateUpdated` is
//! broadcast; receivers fetch a fresh [`Session::snapshot`].

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::client::MirrorClient;
use crate::config::Config;
use crate::discovery::{
    backend_options, race_registry, BackendChoice, BackendOption, BackendStatus, Discovery,
};
use crate::error::{ClientError, LaunchError, SearchError, SelectError, ViewError};
use crate::notify::{NotificationQueue, Severity};
use crate::prefs::{PrefStore, OPTIMIZED_KEY, XFRAME_KEY};
use crate::protocol::SessionEvent;
use crate::registry::{Endpoint, Registry};
use crate::render::{extract_id, FrameMode, Player, PlayerId, PlayerState, SearchResult, SearchResults, VideoId};
use crate::view::{ViewController, ViewId};

/// Everything a front end needs to draw itself.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub rev: u64,
    /// `None` means fallback mode.
    pub active_backend: Option<Endpoint>,
    pub status: BackendStatus,
    pub backends: Vec<BackendOption>,
    pub xframe_enabled: bool,
    pub optimized_mode: bool,
    #[serde(rename = "current_view")]
    pub view: ViewController,
    /// Newest first.
    pub players: Vec<Player>,
    pub results: SearchResults,
    pub notifications: NotificationQueue,

    #[serde(skip)]
    prefs: PrefStore,
    #[serde(skip)]
    discovery_gen: u64,
    #[serde(skip)]
    search_gen: u64,
    #[serde(skip)]
    last_player_id: u64,
}

pub struct Session {
    client: MirrorClient,
    registry: Registry,
    probe_timeout: Duration,
    state: RwLock<SessionState>,
    events: broadcast::Sender<SessionEvent>,
    prefs_io: Mutex<()>,
}

impl Session {
    pub fn new(config: &Config, prefs: PrefStore) -> Result<Self, ClientError> {
        let registry = Registry::from_urls(&config.discovery.instances);
        let client = MirrorClient::new()?;

        let state = SessionState {
            rev: 1,
            active_backend: None,
            status: BackendStatus::idle(),
            backends: backend_options(&registry, None),
            xframe_enabled: prefs.get_flag(XFRAME_KEY),
            optimized_mode: prefs.get_flag(OPTIMIZED_KEY),
            view: ViewController::default(),
            players: Vec::new(),
            results: SearchResults::Idle,
            notifications: NotificationQueue::new(config.notifications.duration()),
            prefs,
            discovery_gen: 0,
            search_gen: 0,
            last_player_id: 0,
        };

        let (events, _) = broadcast::channel(256);
        info!(
            "session: {} candidate mirrors, probe timeout {}ms",
            registry.len(),
            config.discovery.probe_timeout_ms
        );

        Ok(Self {
            client,
            registry,
            probe_timeout: config.discovery.probe_timeout(),
            state: RwLock::new(state),
            events,
            prefs_io: Mutex::new(()),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn active_backend(&self) -> Option<Endpoint> {
        self.state.read().await.active_backend.clone()
    }

    pub async fn xframe_enabled(&self) -> bool {
        self.state.read().await.xframe_enabled
    }

    pub async fn optimized_mode(&self) -> bool {
        self.state.read().await.optimized_mode
    }

    pub async fn current_view(&self) -> ViewId {
        self.state.read().await.view.current()
    }

    /// Apply `f` under the write lock, bump `rev` and broadcast.
    async fn mutate<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let (out, rev) = {
            let mut state = self.state.write().await;
            let out = f(&mut state);
            state.rev += 1;
            (out, state.rev)
        };
        // No receivers is fine (headless use, tests).
        let _ = self.events.send(SessionEvent::StateUpdated { rev });
        out
    }

    // ── Discovery ─────────────────────────────────────────────────────────────

    /// Race every candidate and replace the selection with the outcome.
    ///
    /// If another discovery or a manual selection starts while this one is
    /// probing, this result is returned but not applied.
    pub async fn discover(&self) -> Discovery {
        let gen = self
            .mutate(|st| {
                st.discovery_gen += 1;
                st.status = BackendStatus::searching();
                st.discovery_gen
            })
            .await;

        let selected = race_registry(&self.client, &self.registry, self.probe_timeout).await;
        let status = match &selected {
            Some(endpoint) => BackendStatus::connected(endpoint),
            None => BackendStatus::fallback(),
        };
        let discovery = Discovery { selected, status };

        let applied = self
            .mutate(|st| {
                if st.discovery_gen != gen {
                    return false;
                }
                st.active_backend = discovery.selected.clone();
                st.status = discovery.status.clone();
                st.backends = backend_options(&self.registry, st.active_backend.as_ref());
                true
            })
            .await;

        if applied {
            info!("discovery #{}: {}", gen, discovery.status.text);
        } else {
            debug!("discovery #{} superseded, result dropped", gen);
        }
        discovery
    }

    /// Manual override. `Auto` re-runs discovery; a mirror is trusted without
    /// probing but must belong to the registry.
    pub async fn select_backend(&self, choice: BackendChoice) -> Result<Discovery, SelectError> {
        let endpoint = match choice {
            BackendChoice::Auto => return Ok(self.discover().await),
            BackendChoice::Manual(endpoint) => endpoint,
        };
        if !self.registry.contains(&endpoint) {
            warn!("select_backend: {} is not in the registry", endpoint);
            return Err(SelectError::UnknownBackend(endpoint.to_string()));
        }

        let status = BackendStatus::manual(&endpoint);
        self.mutate(|st| {
            // Invalidate any discovery still in flight.
            st.discovery_gen += 1;
            st.active_backend = Some(endpoint.clone());
            st.status = status.clone();
            st.backends = backend_options(&self.registry, Some(&endpoint));
        })
        .await;
        info!("backend manually set to {}", endpoint);

        Ok(Discovery {
            selected: Some(endpoint),
            status,
        })
    }

    /// String form used by the selector and HTTP API (`"auto"` or a URL).
    pub async fn select_backend_named(&self, choice: &str) -> Result<Discovery, SelectError> {
        let choice: BackendChoice = choice
            .parse()
            .map_err(|_| SelectError::UnknownBackend(choice.to_string()))?;
        self.select_backend(choice).await
    }

    // ── Playback ──────────────────────────────────────────────────────────────

    /// Parse `raw` (link or bare id) and put a new player at the front.
    ///
    /// The player is usable immediately with a placeholder title. With a
    /// backend, its title is filled in from mirror metadata once that
    /// arrives; a metadata failure only logs.
    pub async fn launch_video(&self, raw: &str) -> Result<PlayerId, LaunchError> {
        let Some(video_id) = extract_id(raw) else {
            self.notify("Invalid URL", Severity::Warning).await;
            return Err(LaunchError::InvalidInput(raw.to_string()));
        };
        Ok(self.create_player(video_id).await)
    }

    async fn create_player(&self, video_id: VideoId) -> PlayerId {
        let (id, backend) = self
            .mutate(|st| {
                st.last_player_id += 1;
                let id = PlayerId(st.last_player_id);
                let backend = st.active_backend.clone();
                let frame = if st.xframe_enabled {
                    FrameMode::XFrameProxy
                } else {
                    FrameMode::Plain
                };
                st.players
                    .insert(0, Player::new(id, video_id.clone(), backend.as_ref(), frame));
                (id, backend)
            })
            .await;
        info!(
            "player {} created for {} via {}",
            id.0,
            video_id,
            backend.as_ref().map(Endpoint::as_str).unwrap_or("fallback")
        );

        let Some(backend) = backend else {
            return id;
        };

        let title = match self.client.video_meta(&backend, video_id.as_str()).await {
            Ok(meta) => Some(meta.title),
            Err(e) => {
                warn!("metadata for {} from {} failed: {}", video_id, backend, e);
                None
            }
        };

        self.mutate(|st| match st.players.iter_mut().find(|p| p.id == id) {
            Some(player) => {
                if let Some(title) = title {
                    player.title = title;
                }
                player.state = PlayerState::Ready;
            }
            None => debug!("player {} removed before metadata arrived", id.0),
        })
        .await;
        id
    }

    /// Remove one player. Others are untouched.
    pub async fn remove_player(&self, id: PlayerId) -> bool {
        let removed = self
            .mutate(|st| {
                let before = st.players.len();
                st.players.retain(|p| p.id != id);
                st.players.len() != before
            })
            .await;
        if removed {
            debug!("player {} removed", id.0);
        }
        removed
    }

    // ── Search ────────────────────────────────────────────────────────────────

    /// Search the active mirror and replace the result pane with the answer.
    ///
    /// Returns the number of results shown. A response that arrives after a
    /// newer search started is dropped (`SearchError::Superseded`).
    pub async fn search(&self, query: &str) -> Result<usize, SearchError> {
        let Some(backend) = self.active_backend().await else {
            self.notify("No Invidious Instance Connected", Severity::Warning)
                .await;
            return Err(SearchError::NoBackend);
        };

        let gen = self
            .mutate(|st| {
                st.search_gen += 1;
                st.results = SearchResults::Loading;
                st.search_gen
            })
            .await;

        let outcome = self.client.search(&backend, query).await;

        let result = self
            .mutate(|st| {
                if st.search_gen != gen {
                    return Err(SearchError::Superseded);
                }
                match outcome {
                    Ok(items) => {
                        let results: Vec<SearchResult> =
                            items.into_iter().map(SearchResult::from).collect();
                        let count = results.len();
                        st.results = SearchResults::Items(results);
                        Ok(count)
                    }
                    Err(e) => {
                        st.results = SearchResults::Failed;
                        Err(SearchError::Request(e))
                    }
                }
            })
            .await;

        match &result {
            Ok(count) => info!("search {:?} on {}: {} results", query, backend, count),
            Err(SearchError::Superseded) => debug!("search {:?} superseded", query),
            Err(e) => warn!("search {:?} on {} failed: {}", query, backend, e),
        }
        result
    }

    /// Clicking a result: go to the home view and launch it.
    pub async fn open_result(&self, index: usize) -> Result<PlayerId, LaunchError> {
        let video_id = {
            let state = self.state.read().await;
            state.results.items().get(index).map(|r| r.video_id.clone())
        };
        let Some(video_id) = video_id else {
            return Err(LaunchError::NoSuchResult(index));
        };
        self.switch_view(ViewId::Home).await;
        // Launched by the mirror's identifier; no link parsing involved.
        Ok(self.create_player(VideoId::from_mirror(video_id)).await)
    }

    // ── Views ─────────────────────────────────────────────────────────────────

    pub async fn switch_view(&self, view: ViewId) -> bool {
        self.mutate(|st| st.view.switch(view)).await
    }

    /// Unknown ids are rejected and leave the current view unchanged.
    pub async fn switch_view_named(&self, name: &str) -> Result<bool, ViewError> {
        let result = self.mutate(|st| st.view.switch_named(name)).await;
        if let Err(e) = &result {
            warn!("switch_view: {}", e);
        }
        result
    }

    // ── Notifications ─────────────────────────────────────────────────────────

    pub async fn notify(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let message = message.into();
        debug!("notify [{:?}] {}", severity, message);
        self.mutate(|st| st.notifications.push(message, severity))
            .await
    }

    /// Drop expired notifications; only broadcasts if something expired.
    pub async fn prune_notifications(&self) -> bool {
        let rev = {
            let mut state = self.state.write().await;
            if !state.notifications.prune() {
                return false;
            }
            state.rev += 1;
            state.rev
        };
        let _ = self.events.send(SessionEvent::StateUpdated { rev });
        true
    }

    // ── Preferences ───────────────────────────────────────────────────────────

    /// Flip frame-rendering mode. Applies to players created afterwards.
    pub async fn toggle_xframe(&self) -> bool {
        let enabled = self
            .toggle_flag(XFRAME_KEY, |st| {
                st.xframe_enabled = !st.xframe_enabled;
                st.xframe_enabled
            })
            .await;
        let label = if enabled { "Enabled" } else { "Disabled" };
        self.notify(format!("X-Frame Proxy {}", label), Severity::Info)
            .await;
        enabled
    }

    /// Flip reduced-effects mode.
    pub async fn toggle_optimized(&self) -> bool {
        let enabled = self
            .toggle_flag(OPTIMIZED_KEY, |st| {
                st.optimized_mode = !st.optimized_mode;
                st.optimized_mode
            })
            .await;
        info!("optimized mode {}", if enabled { "on" } else { "off" });
        enabled
    }

    /// Flip a flag under the state lock, then write the store after the lock
    /// is released. `prefs_io` keeps writes in the same order as the flips.
    async fn toggle_flag(&self, key: &str, flip: impl FnOnce(&mut SessionState) -> bool) -> bool {
        let _io = self.prefs_io.lock().await;
        let (value, prefs) = self
            .mutate(|st| {
                let value = flip(st);
                st.prefs.set_flag(key, value);
                (value, st.prefs.clone())
            })
            .await;
        if let Err(e) = prefs.save().await {
            warn!("prefs: failed to persist {}={}: {}", key, value, e);
        }
        value
    }
}
