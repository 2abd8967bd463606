use std::time::Duration;

use thiserror::Error;

/// Backend address used when neither the caller nor the environment names one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable that overrides [`DEFAULT_BASE_URL`] for every endpoint.
pub const BASE_URL_ENV: &str = "MAILMORPH_API_BASE_URL";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{source_name} is not a valid base url ({value}): {message}")]
    InvalidBaseUrl {
        source_name: String,
        value: String,
        message: String,
    },
    #[error("failed to build http transport: {0}")]
    Transport(String),
}

/// Which request body the extraction endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractContract {
    /// `{ "text": ... }`
    #[default]
    Current,
    /// `{ "text": ..., "max_words": ... }`
    Legacy,
}

/// Transport-level limits. Unset means the transport never gives up on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportSettings {
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

/// Client configuration, resolved once per process and injected into the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientConfig {
    env_base_url: Option<String>,
    pub contract: ExtractContract,
    pub transport: TransportSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads [`BASE_URL_ENV`] from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup(BASE_URL_ENV) {
            Some(value) if !value.trim().is_empty() => Self::new().with_env_base_url(value),
            _ => Ok(Self::new()),
        }
    }

    pub fn with_env_base_url(mut self, value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        validate_base_url(BASE_URL_ENV, &value)?;
        self.env_base_url = Some(value.trim().to_string());
        Ok(self)
    }

    pub fn with_contract(mut self, contract: ExtractContract) -> Self {
        self.contract = contract;
        self
    }

    pub fn with_transport(mut self, transport: TransportSettings) -> Self {
        self.transport = transport;
        self
    }

    pub fn env_base_url(&self) -> Option<&str> {
        self.env_base_url.as_deref()
    }

    /// Explicit argument, then the environment default, then [`DEFAULT_BASE_URL`].
    pub fn resolve_base_url<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or(self.env_base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    /// Full URL of `path` under the resolved base.
    pub fn endpoint(&self, explicit: Option<&str>, path: &str) -> String {
        join_url(self.resolve_base_url(explicit), path)
    }
}

/// Checks that `value` is an absolute http(s) URL.
pub fn validate_base_url(source_name: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidBaseUrl {
        source_name: source_name.to_string(),
        value: value.to_string(),
        message,
    };
    let parsed = reqwest::Url::parse(value.trim()).map_err(|err| invalid(err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
