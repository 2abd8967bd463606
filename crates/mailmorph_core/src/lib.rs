//! MailMorph core: data model, timestamp normalization and the pure view state machine.
mod effect;
mod extraction;
mod lifecycle;
mod msg;
mod records;
mod state;
mod timestamp;
mod update;
mod view_model;

pub use effect::Effect;
pub use extraction::{
    BrokerDetails, ExtractedSummary, ExtractionRequest, ExtractionResult, NotAnObject,
    DEFAULT_MAX_WORDS,
};
pub use lifecycle::{FetchLifecycle, FetchState, Phase, Ticket};
pub use msg::Msg;
pub use records::{DocumentId, LogRecord, MetricRecord, TelemetryRow};
pub use state::{AppState, Notice, ViewKind};
pub use timestamp::{
    normalize_timestamp, parse_date_string, NormalizedTimestamp, TimestampShape, DISPLAY_FORMAT,
};
pub use update::update;
pub use view_model::{AppViewModel, LogRowView, MetricRowView};
