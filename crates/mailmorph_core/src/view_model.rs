use crate::{ExtractionResult, FetchState, LogRecord, MetricRecord, NormalizedTimestamp, Notice};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub input: String,
    pub can_submit: bool,
    pub extraction: FetchState<ExtractionResult>,
    pub metrics: FetchState<MetricRecord>,
    pub logs: FetchState<LogRecord>,
    pub notice: Option<Notice>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRowView {
    pub tokens_used: Option<i64>,
    pub latency: Option<f64>,
    pub timestamp: NormalizedTimestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRowView {
    pub request_id: Option<String>,
    pub source_hash: Option<String>,
    pub cache_hit: Option<bool>,
    pub latency: Option<f64>,
    pub timestamp: NormalizedTimestamp,
}

impl AppViewModel {
    /// The latest extraction document, if one has arrived.
    pub fn extraction_result(&self) -> Option<&ExtractionResult> {
        self.extraction.items.first()
    }

    /// Metric rows with timestamps normalized for this render.
    pub fn metric_rows(&self) -> Vec<MetricRowView> {
        self.metrics
            .items
            .iter()
            .map(|record| MetricRowView {
                tokens_used: record.tokens_used,
                latency: record.latency,
                timestamp: record.normalized_timestamp(),
            })
            .collect()
    }

    /// Log rows with timestamps normalized for this render.
    pub fn log_rows(&self) -> Vec<LogRowView> {
        self.logs
            .items
            .iter()
            .map(|record| LogRowView {
                request_id: record.request_id.clone(),
                source_hash: record.source_hash.clone(),
                cache_hit: record.cache_hit,
                latency: record.latency,
                timestamp: record.normalized_timestamp(),
            })
            .collect()
    }
}
