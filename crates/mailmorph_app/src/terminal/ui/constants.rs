pub const LOADING: &str = "Loading...";

pub const TITLE_EXTRACT: &str = "Extracted JSON";
pub const TITLE_METRICS: &str = "Metrics";
pub const TITLE_LOGS: &str = "View Logging";

pub const NOTICE_EMPTY_INPUT: &str =
    "No input provided: please paste an email to extract text from.";
pub const NOTICE_EXTRACTED: &str = "JSON generated successfully.";
pub const NOTICE_EXTRACTION_FAILED: &str = "Extraction failed.";

pub const METRIC_HEADERS: [&str; 3] = ["Tokens Used", "Latency (ms)", "Timestamp"];
pub const LOG_HEADERS: [&str; 5] = [
    "Request ID",
    "Source Hash",
    "Cache Hit",
    "Latency (ms)",
    "Timestamp",
];
