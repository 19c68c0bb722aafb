// ── Runtime connection configuration ──
//
// Describes *how* to reach the backend. Never touches disk: the CLI/TUI
// build a `BackendConfig` from their profile and hand it in.

use std::sync::Arc;
use std::time::Duration;

use bizdash_api::{ApiClient, DEFAULT_TIMEOUT, TlsMode, TransportConfig};
use url::Url;

use crate::error::CoreError;

/// Connection settings for one backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// API base URL, e.g. `http://localhost:8000/api`.
    pub url: Url,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsMode::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }

    /// Build the shared HTTP client for this backend.
    pub fn connect(&self) -> Result<Arc<ApiClient>, CoreError> {
        let client = ApiClient::new(self.url.as_str(), &self.transport())?;
        Ok(Arc::new(client))
    }
}
