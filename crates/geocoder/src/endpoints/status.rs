//! Service health probe (`/status`)

use crate::client::NominatimClient;
use crate::error::GeocoderResult;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Status API interface
#[derive(Clone)]
pub struct StatusApi {
    client: NominatimClient,
}

impl StatusApi {
    /// Create a new status API interface
    pub(crate) fn new(client: NominatimClient) -> Self {
        Self { client }
    }

    /// Query the service status
    pub async fn check(&self) -> GeocoderResult<ServiceStatus> {
        self.client.get("status", &[("format", "json")]).await
    }

    /// Query the service status with timing information
    pub async fn check_timed(&self) -> GeocoderResult<(ServiceStatus, Duration)> {
        let start = Instant::now();
        let status = self.check().await?;
        Ok((status, start.elapsed()))
    }
}

/// Status response from the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Zero when the service is healthy
    pub status: i32,
    /// Human-readable status ("OK" when healthy)
    pub message: String,
    /// Timestamp of the last data import
    #[serde(default)]
    pub data_updated: Option<String>,
    /// Server software version
    #[serde(default)]
    pub software_version: Option<String>,
    /// Database schema version
    #[serde(default)]
    pub database_version: Option<String>,
}

impl ServiceStatus {
    /// Whether the service reports itself healthy
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == 0
    }
}
