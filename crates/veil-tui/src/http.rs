use crate::core::CoreEvent;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use veil_core::discovery::BackendStatus;
use veil_core::protocol::Command;
use veil_core::registry::Endpoint;
use veil_core::session::{Session, SessionState};
use veil_core::view::ViewId;

#[derive(Clone)]
struct HttpState {
    session: Arc<Session>,
    event_tx: mpsc::Sender<CoreEvent>,
}

#[derive(Serialize)]
struct DiscoveryResponse {
    selected: Option<Endpoint>,
    status: BackendStatus,
}

#[derive(Serialize)]
struct ViewResponse {
    current_view: ViewId,
    changed: bool,
}

pub fn start_server(
    bind_address: String,
    port: u16,
    session: Arc<Session>,
    event_tx: mpsc::Sender<CoreEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let app = router(HttpState { session, event_tx });

        let addr = format!("{}:{}", bind_address, port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind HTTP server to {}: {}", addr, e);
                return;
            }
        };

        info!("HTTP API server listening on http://{}", addr);

        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    })
}

fn router(state: HttpState) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/command", post(send_command))
        .route("/api/discover", get(discover).post(discover))
        .route("/api/view/:view", get(switch_view).post(switch_view))
        .route("/api/players/:id/embed", get(player_embed))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_state(State(state): State<HttpState>) -> Json<SessionState> {
    Json(state.session.snapshot().await)
}

async fn send_command(State(state): State<HttpState>, Json(cmd): Json<Command>) -> StatusCode {
    info!("HTTP API: {:?}", cmd);
    if state.event_tx.send(CoreEvent::Command(cmd)).await.is_err() {
        error!("Failed to forward command");
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    StatusCode::ACCEPTED
}

/// Runs discovery inline so the caller sees the outcome.
async fn discover(State(state): State<HttpState>) -> Json<DiscoveryResponse> {
    info!("HTTP API: discover");
    let discovery = state.session.discover().await;
    Json(DiscoveryResponse {
        selected: discovery.selected,
        status: discovery.status,
    })
}

async fn switch_view(
    State(state): State<HttpState>,
    Path(view): Path<String>,
) -> Result<Json<ViewResponse>, StatusCode> {
    match state.session.switch_view_named(&view).await {
        Ok(changed) => Ok(Json(ViewResponse {
            current_view: state.session.current_view().await,
            changed,
        })),
        Err(e) => {
            warn!("HTTP API: {}", e);
            Err(StatusCode::NOT_FOUND)
        }
    }
}

async fn player_embed(
    State(state): State<HttpState>,
    Path(id): Path<u64>,
) -> Result<Html<String>, StatusCode> {
    let snapshot = state.session.snapshot().await;
    snapshot
        .players
        .iter()
        .find(|p| p.id.0 == id)
        .map(|p| Html(p.iframe_html()))
        .ok_or(StatusCode::NOT_FOUND)
}
