use serde::Deserialize;
use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    /// Non-2xx from `/extract`; `body` is whatever text the server sent, or empty.
    #[error("Extraction failed ({status}): {body}")]
    Extraction { status: u16, body: String },
    /// Non-2xx from a telemetry or health endpoint.
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },
    /// No response at all: DNS, connect, reset or timeout.
    #[error("network error: {message}")]
    Network { message: String },
    /// A 2xx response whose body is not the JSON the endpoint promises.
    #[error("invalid response body: {message}")]
    InvalidBody { message: String },
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Extraction { status, .. } | RequestError::HttpStatus { status } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, RequestError::Network { .. })
    }

    pub(crate) fn invalid_body(err: impl std::fmt::Display) -> Self {
        RequestError::InvalidBody {
            message: err.to_string(),
        }
    }
}

/// Per-call overrides for [`Backend::extract`](crate::Backend::extract).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractOptions {
    /// Only sent under the legacy contract.
    pub max_words: Option<u32>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
