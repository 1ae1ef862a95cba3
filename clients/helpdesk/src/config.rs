//! Backend endpoint configuration

use anyhow::Result;
use std::env;
use std::time::Duration;

/// Configuration for the remote ticketing backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend, without a trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl BackendConfig {
    /// Create a new BackendConfig from environment variables
    ///
    /// # Environment Variables
    /// - `TICKETING_BASE_URL`: Backend base URL (default: "http://localhost:8080")
    /// - `TICKETING_REQUEST_TIMEOUT`: Per-request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("TICKETING_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let timeout_seconds = env::var("TICKETING_REQUEST_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(timeout_seconds),
        })
    }
}
