use serde::{Deserialize, Serialize};

// ── Mirror API (Invidious v1) ─────────────────────────────────────────────────

/// `GET /api/v1/videos/{id}`, only the fields we render.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMeta {
    pub title: String,
}

/// One entry of `GET /api/v1/search?type=video`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// Some mirrors omit thumbnails entirely.
    #[serde(default)]
    pub video_thumbnails: Option<Vec<Thumbnail>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub quality: String,
    pub url: String,
}

// ── Control surface ───────────────────────────────────────────────────────────

/// Commands sent from a front end (TUI keys, HTTP API) to the session loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Command {
    Discover,
    /// `"auto"` re-runs discovery; anything else must be a known mirror URL.
    SelectBackend { choice: String },
    Launch { input: String },
    RemovePlayer { id: u64 },
    Search { query: String },
    OpenResult { index: usize },
    SwitchView { view: String },
    ToggleXFrame,
    ToggleOptimized,
}

/// Broadcast by `Session` after every state mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    StateUpdated { rev: u64 },
}
