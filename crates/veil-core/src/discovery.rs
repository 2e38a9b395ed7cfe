//! Backend discovery: race health probes across the registry.
//!
//! Every candidate is probed at once. The first probe to succeed wins and the
//! rest are dropped; if none succeeds the session runs in fallback mode
//! (direct no-cookie embeds, no search). "Everyone failed" is a regular
//! outcome of [`first_success`], not an error.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tracing::{debug, info};

use crate::client::MirrorClient;
use crate::error::{ProbeFailure, RegistryError};
use crate::registry::{Endpoint, Registry};

/// Result of racing a set of fallible futures.
#[derive(Debug)]
pub enum RaceOutcome<T, E> {
    /// The first future to resolve `Ok`.
    Winner(T),
    /// Every future resolved `Err` (or there were none), in completion order.
    AllFailed(Vec<E>),
}

/// Poll all futures concurrently and resolve on the first `Ok`.
///
/// Futures still pending when a winner arrives are dropped with the stream.
pub async fn first_success<I, F, T, E>(futures: I) -> RaceOutcome<T, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    let mut pending: FuturesUnordered<F> = futures.into_iter().collect();
    let mut failures = Vec::new();
    while let Some(result) = pending.next().await {
        match result {
            Ok(value) => return RaceOutcome::Winner(value),
            Err(e) => failures.push(e),
        }
    }
    RaceOutcome::AllFailed(failures)
}

/// Probe every candidate and return the first healthy one, or `None`.
pub async fn race_registry(
    client: &MirrorClient,
    registry: &Registry,
    timeout: Duration,
) -> Option<Endpoint> {
    let probes = registry.endpoints().iter().map(|endpoint| async move {
        match client.probe(endpoint, timeout).await {
            Ok(()) => Ok(endpoint.clone()),
            Err(e) => Err((endpoint.clone(), e)),
        }
    });

    match first_success(probes).await {
        RaceOutcome::Winner(endpoint) => {
            info!("discovery: {} answered first", endpoint);
            Some(endpoint)
        }
        RaceOutcome::AllFailed(failures) => {
            for (endpoint, e) in &failures {
                debug!("discovery: {} failed ({}): {}", endpoint, failure_label(e), e);
            }
            info!(
                "discovery: all {} mirrors failed, using fallback",
                failures.len()
            );
            None
        }
    }
}

/// How the current backend was arrived at; drives status colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Idle,
    Searching,
    Connected,
    Fallback,
    Manual,
}

/// Display status for the backend indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub kind: StatusKind,
    pub text: String,
}

impl BackendStatus {
    pub fn idle() -> Self {
        Self {
            kind: StatusKind::Idle,
            text: "Not connected".to_string(),
        }
    }

    pub fn searching() -> Self {
        Self {
            kind: StatusKind::Searching,
            text: "Finding best server...".to_string(),
        }
    }

    pub fn connected(endpoint: &Endpoint) -> Self {
        Self {
            kind: StatusKind::Connected,
            text: format!("Connected: {}", endpoint.host()),
        }
    }

    pub fn fallback() -> Self {
        Self {
            kind: StatusKind::Fallback,
            text: "Using Fallback (Youtube-NoCookie)".to_string(),
        }
    }

    pub fn manual(endpoint: &Endpoint) -> Self {
        Self {
            kind: StatusKind::Manual,
            text: format!("Manual: {}", endpoint.host()),
        }
    }
}

/// One row of the backend selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendOption {
    pub endpoint: Endpoint,
    pub label: String,
    pub selected: bool,
}

/// Build the selector list, marking `active` if it is set.
pub fn backend_options(registry: &Registry, active: Option<&Endpoint>) -> Vec<BackendOption> {
    registry
        .endpoints()
        .iter()
        .map(|endpoint| BackendOption {
            endpoint: endpoint.clone(),
            label: endpoint.host(),
            selected: Some(endpoint) == active,
        })
        .collect()
}

/// What `Session::discover` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub selected: Option<Endpoint>,
    pub status: BackendStatus,
}

/// Manual backend override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendChoice {
    Auto,
    Manual(Endpoint),
}

impl FromStr for BackendChoice {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            Endpoint::parse(s).map(Self::Manual)
        }
    }
}

fn failure_label(e: &ProbeFailure) -> &'static str {
    match e {
        ProbeFailure::Timeout(_) => "timeout",
        ProbeFailure::Network(_) => "network",
        ProbeFailure::Status(_) => "status",
    }
}
