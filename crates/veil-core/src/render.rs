//! Content rendering: video id extraction, embed URLs, players and results.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;

use crate::protocol::{SearchItem, Thumbnail};
use crate::registry::Endpoint;

/// Origin used when no mirror is reachable.
pub const FALLBACK_EMBED_BASE: &str = "https://www.youtube-nocookie.com/embed";

/// Title shown until (or unless) mirror metadata arrives.
pub const PLACEHOLDER_TITLE: &str = "YouTube Video";

// ── Video identifiers ─────────────────────────────────────────────────────────

/// An 11-character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Identifier supplied by a mirror, taken as is.
    pub(crate) fn from_mirror(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn link_pattern() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| {
        Regex::new(r"(?:youtu\.be/|youtube\.com/.*v=)([A-Za-z0-9_-]{11})")
            .expect("static regex is valid")
    })
}

fn bare_pattern() -> &'static Regex {
    static BARE: OnceLock<Regex> = OnceLock::new();
    BARE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("static regex is valid"))
}

/// Pull a video id out of a short link (`youtu.be/{id}`), a long link
/// (`youtube.com/watch?v={id}`, `youtube.com/embed?...&v={id}`) or a bare id.
pub fn extract_id(raw: &str) -> Option<VideoId> {
    let raw = raw.trim();
    if let Some(caps) = link_pattern().captures(raw) {
        return caps.get(1).map(|m| VideoId(m.as_str().to_string()));
    }
    bare_pattern()
        .is_match(raw)
        .then(|| VideoId(raw.to_string()))
}

/// `{backend}/embed/{id}?autoplay=1`, or the no-cookie origin in fallback mode.
pub fn embed_url(backend: Option<&Endpoint>, id: &VideoId) -> String {
    match backend {
        Some(endpoint) => endpoint.join(&format!("/embed/{}?autoplay=1", id)),
        None => format!("{}/{}?autoplay=1", FALLBACK_EMBED_BASE, id),
    }
}

// ── Players ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

/// Player lifecycle. Removal is terminal and simply drops the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// Playable with the placeholder title; mirror metadata still in flight.
    MetadataPending,
    Ready,
}

/// How the embed frame is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameMode {
    Plain,
    /// Wrapped by the `x-frame-anywhere` custom element, which proxies
    /// embeds that refuse to be framed.
    XFrameProxy,
}

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub video_id: VideoId,
    pub title: String,
    pub embed_url: String,
    pub frame: FrameMode,
    pub state: PlayerState,
    pub created_at: DateTime<Local>,
}

impl Player {
    pub fn new(id: PlayerId, video_id: VideoId, backend: Option<&Endpoint>, frame: FrameMode) -> Self {
        let state = if backend.is_some() {
            PlayerState::MetadataPending
        } else {
            PlayerState::Ready
        };
        Self {
            id,
            embed_url: embed_url(backend, &video_id),
            video_id,
            title: PLACEHOLDER_TITLE.to_string(),
            frame,
            state,
            created_at: Local::now(),
        }
    }

    /// Embed markup for browser surfaces.
    pub fn iframe_html(&self) -> String {
        let is_attr = match self.frame {
            FrameMode::Plain => "",
            FrameMode::XFrameProxy => r#" is="x-frame-anywhere""#,
        };
        format!(
            r#"<iframe{} src="{}" title="{}" style="width:100%;height:400px;border:none" allow="autoplay; fullscreen; encrypted-media"></iframe>"#,
            is_attr,
            escape_attr(&self.embed_url),
            escape_attr(&self.title),
        )
    }
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ── Search results ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub video_id: String,
    pub title: String,
    pub author: String,
    /// Empty when the mirror sent no thumbnails.
    pub thumbnail: String,
}

impl From<SearchItem> for SearchResult {
    fn from(item: SearchItem) -> Self {
        let thumbnail = pick_thumbnail(item.video_thumbnails.as_deref());
        Self {
            video_id: item.video_id,
            title: item.title,
            author: item.author,
            thumbnail,
        }
    }
}

/// Prefer the `medium` variant, else the first one, else nothing.
pub fn pick_thumbnail(thumbs: Option<&[Thumbnail]>) -> String {
    let thumbs = thumbs.unwrap_or_default();
    thumbs
        .iter()
        .find(|t| t.quality == "medium")
        .or_else(|| thumbs.first())
        .map(|t| t.url.clone())
        .unwrap_or_default()
}

/// The result pane. Every search replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "items", rename_all = "snake_case")]
pub enum SearchResults {
    #[default]
    Idle,
    Loading,
    Items(Vec<SearchResult>),
    Failed,
}

impl SearchResults {
    pub fn items(&self) -> &[SearchResult] {
        match self {
            Self::Items(items) => items,
            _ => &[],
        }
    }
}
