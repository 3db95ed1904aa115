//! Process configuration, read once from the environment at startup.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Environment variable holding the external backend base URL.
pub const BACKEND_URL_ENV: &str = "PYTHON_BACKEND_URL";
/// Environment variable holding the proxy API base path (or absolute URL).
pub const API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";
/// Environment variable holding the origin a relative API base is resolved against.
pub const ORIGIN_ENV: &str = "CODEHELPER_ORIGIN";
/// Environment variable holding the proxy listen port.
pub const PORT_ENV: &str = "CODEHELPER_PORT";
/// Environment variable holding the static asset directory.
pub const STATIC_DIR_ENV: &str = "CODEHELPER_STATIC_DIR";
/// Environment variable overriding the request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "CODEHELPER_TIMEOUT_SECS";

/// Default backend base URL.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
/// Default proxy API base path.
pub const DEFAULT_API_URL: &str = "/api";
/// Default origin for relative API bases.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";
/// Default proxy listen port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default static asset directory.
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Default overall request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Connection establishment timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A URL value could not be parsed.
    #[error("invalid URL in {var}: {source}")]
    InvalidUrl {
        /// Variable that held the value.
        var: &'static str,
        /// Parser error.
        source: url::ParseError,
    },

    /// A numeric value could not be parsed.
    #[error("invalid value for {var}: {value}")]
    InvalidNumber {
        /// Variable that held the value.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Location of the external question-answering backend.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BackendConfig {
    base_url: String,
    request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl BackendConfig {
    /// Create a config pointing at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base(&base_url.into()),
            ..Self::default()
        }
    }

    /// Load from the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = non_empty(lookup(BACKEND_URL_ENV))
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        Url::parse(&base_url).map_err(|source| ConfigError::InvalidUrl {
            var: BACKEND_URL_ENV,
            source,
        })?;

        Ok(Self::new(base_url).with_timeout(timeout_from(&lookup)?))
    }

    /// Set the overall request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Overall request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// `<base>/chat`
    #[must_use]
    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    /// `<base>/health`
    #[must_use]
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }
}

/// Where the transport client sends chat requests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    api_url: String,
    request_timeout: Duration,
}

impl ClientConfig {
    /// Create a config for an absolute API base URL.
    ///
    /// # Errors
    /// Returns an error if `api_url` is not an absolute URL.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Url::parse(api_url).map_err(|source| ConfigError::InvalidUrl {
            var: API_URL_ENV,
            source,
        })?;
        Ok(Self {
            api_url: trim_base(api_url),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Load from the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup. A relative API base such as
    /// `/api` is resolved against the configured origin.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api = non_empty(lookup(API_URL_ENV)).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let origin = non_empty(lookup(ORIGIN_ENV)).unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        let api_url = resolve_api_url(&origin, &api)?;

        Ok(Self {
            api_url: trim_base(api_url.as_str()),
            request_timeout: timeout_from(&lookup)?,
        })
    }

    /// Set the overall request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// API base URL without a trailing slash.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Overall request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Settings for the proxy server process.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    /// Listen port.
    pub port: u16,
    /// Directory served for paths no route matches.
    pub static_dir: String,
    /// Upstream backend.
    pub backend: BackendConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            backend: BackendConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match non_empty(lookup(PORT_ENV)) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber {
                var: PORT_ENV,
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };
        let static_dir =
            non_empty(lookup(STATIC_DIR_ENV)).unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

        Ok(Self {
            port,
            static_dir,
            backend: BackendConfig::from_lookup(&lookup)?,
        })
    }
}

/// Build the shared HTTP client used for outbound calls.
///
/// # Errors
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_http_client(request_timeout: Duration) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(request_timeout)
        .build()
        .map_err(ConfigError::from)
}

fn resolve_api_url(origin: &str, api: &str) -> Result<Url, ConfigError> {
    if let Ok(absolute) = Url::parse(api) {
        return Ok(absolute);
    }
    let base = Url::parse(origin).map_err(|source| ConfigError::InvalidUrl {
        var: ORIGIN_ENV,
        source,
    })?;
    base.join(api).map_err(|source| ConfigError::InvalidUrl {
        var: API_URL_ENV,
        source,
    })
}

fn timeout_from<F>(lookup: &F) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup(TIMEOUT_ENV)) {
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or(ConfigError::InvalidNumber {
                var: TIMEOUT_ENV,
                value: raw,
            }),
        None => Ok(DEFAULT_REQUEST_TIMEOUT),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
