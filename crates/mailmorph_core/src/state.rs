use crate::view_model::AppViewModel;
use crate::{Effect, ExtractionResult, FetchLifecycle, LogRecord, MetricRecord, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Extract,
    Metrics,
    Logs,
}

/// Transient message for the user, shown until dismissed or replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Submit was pressed with blank input; nothing was sent.
    EmptyInput,
    /// An extraction result arrived.
    Extracted,
    /// The extraction request failed.
    ExtractionFailed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    input: String,
    extraction: FetchLifecycle<ExtractionResult>,
    metrics: FetchLifecycle<MetricRecord>,
    logs: FetchLifecycle<LogRecord>,
    notice: Option<Notice>,
    last_ticket: Ticket,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            input: self.input.clone(),
            can_submit: self.can_submit(),
            extraction: self.extraction.snapshot(),
            metrics: self.metrics.snapshot(),
            logs: self.logs.snapshot(),
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn extraction(&self) -> &FetchLifecycle<ExtractionResult> {
        &self.extraction
    }

    pub fn metrics(&self) -> &FetchLifecycle<MetricRecord> {
        &self.metrics
    }

    pub fn logs(&self) -> &FetchLifecycle<LogRecord> {
        &self.logs
    }

    /// Submit is blocked for blank input and while an extraction is outstanding.
    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty() && !self.extraction.is_pending()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_notice(&mut self, notice: Option<Notice>) {
        if self.notice != notice {
            self.notice = notice;
            self.mark_dirty();
        }
    }

    fn next_ticket(&mut self) -> Ticket {
        self.last_ticket += 1;
        self.last_ticket
    }

    /// Starts a fresh extraction lifecycle for the current input.
    pub(crate) fn begin_extraction(&mut self) -> Effect {
        let ticket = self.next_ticket();
        self.extraction = FetchLifecycle::mounted(ticket);
        self.mark_dirty();
        Effect::Extract {
            ticket,
            text: self.input.clone(),
        }
    }

    /// Replaces the view's lifecycle with a fresh one. Returns the effects to run,
    /// including a discard for a request the previous mount left in flight.
    pub(crate) fn mount(&mut self, kind: ViewKind) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if let Some(ticket) = self.unmount(kind) {
            effects.push(Effect::Discard { ticket });
        }
        match kind {
            // The extraction view only fetches on submit.
            ViewKind::Extract => self.extraction = FetchLifecycle::new(),
            ViewKind::Metrics => {
                let ticket = self.next_ticket();
                self.metrics = FetchLifecycle::mounted(ticket);
                effects.push(Effect::FetchMetrics { ticket });
            }
            ViewKind::Logs => {
                let ticket = self.next_ticket();
                self.logs = FetchLifecycle::mounted(ticket);
                effects.push(Effect::FetchLogs { ticket });
            }
        }
        self.mark_dirty();
        effects
    }

    /// Returns the ticket of a request the view was still waiting on.
    pub(crate) fn unmount(&mut self, kind: ViewKind) -> Option<Ticket> {
        let in_flight = match kind {
            ViewKind::Extract => self.extraction.teardown(),
            ViewKind::Metrics => self.metrics.teardown(),
            ViewKind::Logs => self.logs.teardown(),
        };
        if in_flight.is_some() {
            self.mark_dirty();
        }
        in_flight
    }

    pub(crate) fn apply_extraction(
        &mut self,
        ticket: Ticket,
        result: Result<ExtractionResult, String>,
    ) {
        let notice = match &result {
            Ok(_) => Notice::Extracted,
            Err(message) => Notice::ExtractionFailed(message.clone()),
        };
        if self.extraction.settle(ticket, result.map(|doc| vec![doc])) {
            self.notice = Some(notice);
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_metrics(&mut self, ticket: Ticket, result: Result<Vec<MetricRecord>, String>) {
        if self.metrics.settle(ticket, result) {
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_logs(&mut self, ticket: Ticket, result: Result<Vec<LogRecord>, String>) {
        if self.logs.settle(ticket, result) {
            self.mark_dirty();
        }
    }
}
