//! # Fleetwatch Control Plane - Docker
//!
//! Container state over the Docker Engine HTTP API.
//!
//! A [`DockerConnector`] pings the engine once per probe cycle and hands out
//! a [`DockerClient`] that shares one `reqwest` client across probe workers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use fleetwatch_protocols::{
    ContainerState, ControlPlaneClient, ControlPlaneConnector, ControlPlaneError,
};

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;

#[derive(Debug, Deserialize)]
struct InspectResponse {
    #[serde(rename = "State")]
    state: InspectState,
}

#[derive(Debug, Deserialize)]
struct InspectState {
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "StartedAt")]
    started_at: String,
}

/// Opens Docker Engine connections.
pub struct DockerConnector {
    host: String,
    client: Client,
}

impl DockerConnector {
    /// `host` is the engine base URL, e.g. `http://127.0.0.1:2375`.
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self, ControlPlaneError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ControlPlaneError::Request(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            host: host.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl ControlPlaneConnector for DockerConnector {
    async fn connect(&self) -> Result<Arc<dyn ControlPlaneClient>, ControlPlaneError> {
        let url = format!("{}/_ping", self.host);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ControlPlaneError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ControlPlaneError::Unreachable(format!(
                "ping returned {}",
                response.status()
            )));
        }

        debug!(host = %self.host, "Connected to Docker engine");
        Ok(Arc::new(DockerClient {
            host: self.host.clone(),
            client: self.client.clone(),
        }))
    }
}

/// A connection to one Docker engine.
pub struct DockerClient {
    host: String,
    client: Client,
}

#[async_trait]
impl ControlPlaneClient for DockerClient {
    async fn inspect_container(&self, id: &str) -> Result<ContainerState, ControlPlaneError> {
        let url = format!("{}/containers/{}/json", self.host, id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ControlPlaneError::Request(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(ControlPlaneError::ContainerNotFound(id.to_string())),
            status if !status.is_success() => {
                return Err(ControlPlaneError::Request(format!(
                    "inspect {} returned {}",
                    id, status
                )));
            }
            _ => {}
        }

        let inspect: InspectResponse = response
            .json()
            .await
            .map_err(|e| ControlPlaneError::InvalidResponse(e.to_string()))?;

        Ok(ContainerState {
            status: inspect.state.status,
            started_at: parse_started_at(&inspect.state.started_at)?,
        })
    }

    async fn close(&self) {
        debug!(host = %self.host, "Closing Docker engine connection");
    }
}

/// Docker reports RFC 3339 timestamps with nanosecond precision.
fn parse_started_at(value: &str) -> Result<DateTime<Utc>, ControlPlaneError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ControlPlaneError::InvalidResponse(format!("StartedAt {:?}: {}", value, e)))
}
