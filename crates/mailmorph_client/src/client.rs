use mailmorph_core::{
    ExtractionRequest, ExtractionResult, LogRecord, MetricRecord, TelemetryRow,
};
use mailmorph_logging::{mm_debug, mm_warn};
use reqwest::header::CONTENT_TYPE;

use crate::{
    ClientConfig, ConfigError, ExtractContract, ExtractOptions, HealthStatus, RequestError,
};

const EXTRACT_PATH: &str = "extract";
const METRICS_PATH: &str = "metrics";
const LOGGING_PATH: &str = "logging";
const HEALTH_PATH: &str = "health";
const JSON_CONTENT_TYPE: &str = "application/json";

/// The three backend calls every view is built on. One round trip per call, no retries.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn extract(
        &self,
        text: &str,
        options: &ExtractOptions,
    ) -> Result<ExtractionResult, RequestError>;

    /// `null` or empty bodies resolve to an empty list.
    async fn fetch_metrics(&self, base_url: Option<&str>) -> Result<Vec<MetricRecord>, RequestError>;

    /// `null` or empty bodies resolve to an empty list.
    async fn fetch_logs(&self, base_url: Option<&str>) -> Result<Vec<LogRecord>, RequestError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.transport.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.transport.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ConfigError::Transport(err.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET /health`.
    pub async fn health(&self, base_url: Option<&str>) -> Result<HealthStatus, RequestError> {
        let url = self.endpoint(base_url, HEALTH_PATH)?;
        mm_debug!("GET {}", url);
        let response = self.http.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let err = RequestError::HttpStatus {
                status: status.as_u16(),
            };
            mm_warn!("health check failed: {}", err);
            return Err(err);
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&bytes).map_err(RequestError::invalid_body)
    }

    fn endpoint(&self, explicit: Option<&str>, path: &str) -> Result<reqwest::Url, RequestError> {
        let url = self.config.endpoint(explicit, path);
        reqwest::Url::parse(&url).map_err(|err| RequestError::InvalidUrl {
            url,
            message: err.to_string(),
        })
    }

    fn extraction_request(&self, text: &str, options: &ExtractOptions) -> ExtractionRequest {
        match self.config.contract {
            ExtractContract::Current => {
                if options.max_words.is_some() {
                    mm_debug!("max_words ignored: backend uses the current extraction contract");
                }
                ExtractionRequest::new(text)
            }
            ExtractContract::Legacy => ExtractionRequest::legacy(text, options.max_words),
        }
    }

    async fn fetch_rows<T: TelemetryRow>(
        &self,
        base_url: Option<&str>,
        path: &str,
    ) -> Result<Vec<T>, RequestError> {
        let url = self.endpoint(base_url, path)?;
        mm_debug!("POST {}", url);
        let response = self.http.post(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let err = RequestError::HttpStatus {
                status: status.as_u16(),
            };
            mm_warn!("{} request failed: {}", path, err);
            return Err(err);
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        // Rows are decoded one at a time so one bad row cannot fail the table.
        let rows: Option<Vec<serde_json::Value>> =
            serde_json::from_slice(&bytes).map_err(RequestError::invalid_body)?;
        Ok(rows.unwrap_or_default().into_iter().map(T::from_row).collect())
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestClient {
    async fn extract(
        &self,
        text: &str,
        options: &ExtractOptions,
    ) -> Result<ExtractionResult, RequestError> {
        let url = self.endpoint(options.base_url.as_deref(), EXTRACT_PATH)?;
        let body = serde_json::to_vec(&self.extraction_request(text, options))
            .map_err(RequestError::invalid_body)?;
        mm_debug!("POST {} text_len={}", url, text.len());

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            // Losing the error body must not hide the status.
            let body = response.text().await.unwrap_or_default();
            let err = RequestError::Extraction {
                status: status.as_u16(),
                body,
            };
            mm_warn!("extraction request failed: {}", err);
            return Err(err);
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(RequestError::invalid_body)?;
        ExtractionResult::from_value(value).map_err(RequestError::invalid_body)
    }

    async fn fetch_metrics(&self, base_url: Option<&str>) -> Result<Vec<MetricRecord>, RequestError> {
        self.fetch_rows(base_url, METRICS_PATH).await
    }

    async fn fetch_logs(&self, base_url: Option<&str>) -> Result<Vec<LogRecord>, RequestError> {
        self.fetch_rows(base_url, LOGGING_PATH).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    mm_warn!("transport failure: {}", err);
    RequestError::Network {
        message: err.to_string(),
    }
}
