//! Error kinds for every fallible operation in the session.
//!
//! None of these are fatal to a running session. Probe failures only matter
//! in aggregate (see `discovery::RaceOutcome::AllFailed`), metadata failures
//! are logged and swallowed, and the rest are surfaced as notifications or a
//! failed result state by `Session`.

use thiserror::Error;

/// One health probe against one candidate mirror did not succeed.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("probe timed out after {0}ms")]
    Timeout(u64),
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("mirror answered with HTTP {0}")]
    Status(u16),
}

/// A metadata or search request failed.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("mirror answered with HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no video identifier in {0:?}")]
    InvalidInput(String),
    #[error("no search result at index {0}")]
    NoSuchResult(usize),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no mirror connected")]
    NoBackend,
    #[error(transparent)]
    Request(#[from] ClientError),
    /// A newer search started before this one completed; its response was dropped.
    #[error("superseded by a newer search")]
    Superseded,
}

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("{0} is not a known mirror")]
    UnknownBackend(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("unknown view {0:?}")]
    UnknownView(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid endpoint URL {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("preference store I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("preference store is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize: {0}")]
    Serialize(#[from] toml::ser::Error),
}
