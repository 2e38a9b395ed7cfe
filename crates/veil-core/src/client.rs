//! HTTP client for the Invidious-compatible mirror API.

use std::time::Duration;

use tracing::debug;

use crate::error::{ClientError, ProbeFailure};
use crate::protocol::{SearchItem, VideoMeta};
use crate::registry::Endpoint;

const USER_AGENT: &str = concat!("veil/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct MirrorClient {
    http: reqwest::Client,
}

impl MirrorClient {
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http })
    }

    /// Health check: `GET /api/v1/stats`, success only on 2xx within `timeout`.
    /// The body is never read.
    pub async fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> Result<(), ProbeFailure> {
        let url = endpoint.join("/api/v1/stats");
        let resp = match tokio::time::timeout(timeout, self.http.get(&url).send()).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => return Err(ProbeFailure::Network(e)),
            Err(_) => return Err(ProbeFailure::Timeout(timeout.as_millis() as u64)),
        };

        let status = resp.status();
        debug!("probe {} -> {}", endpoint, status);
        if status.is_success() {
            Ok(())
        } else {
            Err(ProbeFailure::Status(status.as_u16()))
        }
    }

    /// `GET /api/v1/videos/{id}`. No deadline: a stalled mirror stalls this call.
    pub async fn video_meta(&self, endpoint: &Endpoint, video_id: &str) -> Result<VideoMeta, ClientError> {
        let url = endpoint.join(&format!("/api/v1/videos/{}", video_id));
        self.get_json(&url, &[]).await
    }

    /// `GET /api/v1/search?q={query}&type=video`.
    pub async fn search(&self, endpoint: &Endpoint, query: &str) -> Result<Vec<SearchItem>, ClientError> {
        let url = endpoint.join("/api/v1/search");
        self.get_json(&url, &[("q", query), ("type", "video")]).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
