//! Candidate mirror endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::error::RegistryError;

/// Base URL of one mirror, normalised without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        let trimmed = raw.trim().trim_end_matches('/');
        let invalid = |reason: &str| RegistryError::InvalidEndpoint {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = reqwest::Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        // Scheme and host are lowercased by the parser.
        Ok(Self(url.as_str().trim_end_matches('/').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host name for status display (`Connected: yewtu.be`).
    pub fn host(&self) -> String {
        reqwest::Url::parse(&self.0)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.0.clone())
    }

    /// `{endpoint}{path}`; `path` must start with `/`.
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, duplicate-free set of candidates, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    endpoints: Vec<Endpoint>,
}

impl Registry {
    /// Build from configured URLs. Unparseable entries and duplicates are
    /// skipped with a warning rather than failing startup.
    pub fn from_urls<S: AsRef<str>>(urls: &[S]) -> Self {
        let mut endpoints: Vec<Endpoint> = Vec::with_capacity(urls.len());
        for raw in urls {
            match Endpoint::parse(raw.as_ref()) {
                Ok(ep) if endpoints.contains(&ep) => {
                    warn!("registry: duplicate mirror {} ignored", ep);
                }
                Ok(ep) => endpoints.push(ep),
                Err(e) => warn!("registry: {}", e),
            }
        }
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn contains(&self, endpoint: &Endpoint) -> bool {
        self.endpoints.contains(endpoint)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
