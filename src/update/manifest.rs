//! Remote manifest fetching

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::DEFAULT_FETCH_TIMEOUT_MS;
use crate::update::error::FetchError;

/// Remote descriptor of the latest published version
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manifest {
    pub version: String,
    /// Everything else in the document; not interpreted by the checker
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Manifest {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            extra: serde_json::Map::new(),
        }
    }

    /// Parse a manifest document. The body must be a JSON object with a
    /// string `version` field.
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

/// Source of the remote manifest
///
/// A single call performs a single request; retrying is left to the
/// polling loop.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch_manifest(&self) -> Result<Manifest, FetchError>;
}

/// Fetches the manifest over HTTP(S) with a GET request
pub struct HttpManifestSource {
    client: reqwest::Client,
    url: String,
}

impl HttpManifestSource {
    /// Creates a source for `url` whose requests expire after `timeout`
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("panel-update-check/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Creates a source using the default request timeout
    pub fn with_default_timeout(url: &str) -> Result<Self, FetchError> {
        Self::new(url, Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS))
    }
}

#[async_trait::async_trait]
impl ManifestSource for HttpManifestSource {
    async fn fetch_manifest(&self) -> Result<Manifest, FetchError> {
        debug!("Fetching manifest from {}", self.url);

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            warn!("Manifest request to {} failed: {}", self.url, e);
            FetchError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Manifest endpoint returned status {}: {}", status, self.url);
            return Err(FetchError::Network(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body = response.text().await?;

        Manifest::from_json(&body).inspect_err(|e| {
            warn!("Failed to parse manifest from {}: {}", self.url, e);
        })
    }
}
