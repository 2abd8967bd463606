use crate::{ExtractionResult, LogRecord, MetricRecord, Ticket, ViewKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the email text box.
    InputChanged(String),
    /// User asked for the current text to be extracted.
    ExtractSubmitted,
    /// A view became visible.
    ViewMounted(ViewKind),
    /// A view went away; any request it still waits on is discarded.
    ViewUnmounted(ViewKind),
    /// Extraction request finished.
    ExtractionSettled {
        ticket: Ticket,
        result: Result<ExtractionResult, String>,
    },
    /// Metrics request finished.
    MetricsSettled {
        ticket: Ticket,
        result: Result<Vec<MetricRecord>, String>,
    },
    /// Logging request finished.
    LogsSettled {
        ticket: Ticket,
        result: Result<Vec<LogRecord>, String>,
    },
    /// User dismissed the current notice.
    NoticeDismissed,
    /// Render tick to coalesce rendering.
    Tick,
}
