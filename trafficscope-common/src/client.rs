//! HTTP client for the traffic snapshot endpoint.

use std::sync::Arc;

use crate::config::EndpointConfig;
use crate::error::{Error, Result};
use crate::model::{Snapshot, current_timestamp_millis};
use crate::normalize::normalize;
use crate::registry::LayoutRegistry;
use crate::wire::RawSnapshot;

/// Fetches and normalizes topology snapshots.
///
/// Cheap to clone: the HTTP connection pool and the registry are shared.
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    http: reqwest::Client,
    url: String,
    registry: Arc<LayoutRegistry>,
}

impl SnapshotClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &EndpointConfig, registry: Arc<LayoutRegistry>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            url = %config.url,
            timeout_ms = config.timeout_ms,
            services = registry.len(),
            "Created snapshot client"
        );

        Ok(Self {
            http,
            url: config.url.clone(),
            registry,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch one snapshot.
    ///
    /// Non-success statuses and undecodable bodies are errors; the caller is
    /// expected to keep its previous snapshot in that case.
    pub async fn fetch(&self) -> Result<Snapshot> {
        let response = self.http.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.bytes().await?;
        let raw = RawSnapshot::from_slice(&body)?;
        let snapshot = normalize(&raw, &self.registry, current_timestamp_millis());

        tracing::debug!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            origin = %snapshot.origin,
            "Fetched snapshot"
        );

        Ok(snapshot)
    }
}
