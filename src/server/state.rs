//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::{self, BackendConfig, ConfigError, ServerConfig};

/// Shared application state. Immutable after startup.
pub struct AppState {
    /// HTTP client for calls to the backend.
    pub http: reqwest::Client,
    /// Backend location.
    pub backend: BackendConfig,
    /// Directory served for unmatched paths.
    pub static_dir: String,
}

impl AppState {
    /// Create application state from the server configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ServerConfig) -> Result<Arc<Self>, ConfigError> {
        let http = config::build_http_client(config.backend.request_timeout())?;
        Ok(Self::with_http(http, config.backend.clone(), &config.static_dir))
    }

    /// Create application state around an existing HTTP client.
    #[must_use]
    pub fn with_http(http: reqwest::Client, backend: BackendConfig, static_dir: &str) -> Arc<Self> {
        Arc::new(Self {
            http,
            backend,
            static_dir: static_dir.to_string(),
        })
    }
}
