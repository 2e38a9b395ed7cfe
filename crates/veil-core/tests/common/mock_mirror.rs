#![allow(dead_code)]

//! In-process stand-in for an Invidious mirror.
//!
//! Search queries steer the reply: `"<count>"` returns that many items,
//! `"<count>:<delay_ms>"` answers after a delay, `"bad"` answers 200 with
//! a body that is not JSON, and `"short"` returns one item whose `videoId` is
//! not 11 characters long.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct Behavior {
    pub stats_status: StatusCode,
    pub stats_delay: Duration,
    pub meta_delay: Duration,
    /// `None` makes the metadata endpoint fail with 500.
    pub title: Option<String>,
}

impl Behavior {
    pub fn healthy() -> Self {
        Self {
            stats_status: StatusCode::OK,
            stats_delay: Duration::ZERO,
            meta_delay: Duration::ZERO,
            title: Some("Mock Title".to_string()),
        }
    }

    pub fn delayed(ms: u64) -> Self {
        Self {
            stats_delay: Duration::from_millis(ms),
            ..Self::healthy()
        }
    }

    pub fn broken() -> Self {
        Self {
            stats_status: StatusCode::INTERNAL_SERVER_ERROR,
            ..Self::healthy()
        }
    }

    pub fn slow_metadata(mut self, ms: u64) -> Self {
        self.meta_delay = Duration::from_millis(ms);
        self
    }

    pub fn without_metadata(mut self) -> Self {
        self.title = None;
        self
    }
}

#[derive(Default)]
pub struct Hits {
    pub stats: AtomicUsize,
    pub meta: AtomicUsize,
    pub search: AtomicUsize,
}

struct Shared {
    behavior: Behavior,
    hits: Arc<Hits>,
}

pub struct MockMirror {
    pub url: String,
    pub hits: Arc<Hits>,
}

impl MockMirror {
    pub async fn spawn(behavior: Behavior) -> Self {
        let hits = Arc::new(Hits::default());
        let shared = Arc::new(Shared {
            behavior,
            hits: hits.clone(),
        });

        let app = Router::new()
            .route("/api/v1/stats", get(stats))
            .route("/api/v1/videos/:id", get(video))
            .route("/api/v1/search", get(search))
            .with_state(shared);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock mirror");
        let addr = listener.local_addr().expect("mock mirror addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("http://{}", addr),
            hits,
        }
    }

    pub fn search_hits(&self) -> usize {
        self.hits.search.load(Ordering::SeqCst)
    }

    pub fn meta_hits(&self) -> usize {
        self.hits.meta.load(Ordering::SeqCst)
    }
}

/// A URL nothing listens on.
pub fn dead_url() -> String {
    "http://127.0.0.1:1".to_string()
}

async fn stats(State(shared): State<Arc<Shared>>) -> StatusCode {
    shared.hits.stats.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(shared.behavior.stats_delay).await;
    shared.behavior.stats_status
}

async fn video(State(shared): State<Arc<Shared>>, Path(id): Path<String>) -> Response {
    shared.hits.meta.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(shared.behavior.meta_delay).await;
    match &shared.behavior.title {
        Some(title) => Json(json!({ "videoId": id, "title": title })).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn search(
    State(shared): State<Arc<Shared>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    shared.hits.search.fetch_add(1, Ordering::SeqCst);
    if params.get("type").map(String::as_str) != Some("video") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let q = params.get("q").cloned().unwrap_or_default();
    if q == "bad" {
        return "<html>definitely not json</html>".into_response();
    }
    if q == "short" {
        return Json(json!([{ "videoId": "abc", "title": "Short id" }])).into_response();
    }

    let (count, delay_ms) = match q.split_once(':') {
        Some((count, delay)) => (count.parse().unwrap_or(0), delay.parse().unwrap_or(0)),
        None => (q.parse().unwrap_or(0), 0),
    };
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    Json(Value::Array((0..count).map(search_item).collect())).into_response()
}

fn search_item(i: usize) -> Value {
    let thumbs = if i % 2 == 0 {
        json!([
            { "quality": "high", "url": format!("http://thumbs/{i}/high.jpg") },
            { "quality": "medium", "url": format!("http://thumbs/{i}/medium.jpg") }
        ])
    } else {
        json!([])
    };
    json!({
        "type": "video",
        "videoId": format!("vid{:08}", i),
        "title": format!("Result {i}"),
        "author": format!("Author {i}"),
        "videoThumbnails": thumbs,
    })
}
