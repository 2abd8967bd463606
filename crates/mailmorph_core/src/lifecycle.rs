use std::fmt;

/// Identifies one in-flight request so late results can be matched or dropped.
pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Idle,
    Loading,
    Loaded(Vec<T>),
    Failed(String),
}

/// The three fields a view observes.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub items: Vec<T>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            error: None,
        }
    }
}

/// Drives one view through `Loading -> Loaded | Failed` around a single request.
///
/// `Loaded` and `Failed` are terminal. After [`FetchLifecycle::teardown`] every
/// transition is a no-op, so a result arriving for an unmounted view is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchLifecycle<T> {
    phase: Phase<T>,
    ticket: Option<Ticket>,
    discarded: bool,
}

impl<T> Default for FetchLifecycle<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            ticket: None,
            discarded: false,
        }
    }
}

impl<T: Clone> FetchLifecycle<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh lifecycle for a view that has just issued the request `ticket`.
    pub fn mounted(ticket: Ticket) -> Self {
        Self {
            phase: Phase::Loading,
            ticket: Some(ticket),
            discarded: false,
        }
    }

    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    pub fn ticket(&self) -> Option<Ticket> {
        self.ticket
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Loaded(_) | Phase::Failed(_))
    }

    /// Loading and still owned by a mounted view.
    pub fn is_pending(&self) -> bool {
        self.is_loading() && !self.discarded
    }

    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    /// Returns whether the transition was applied.
    pub fn resolve(&mut self, ticket: Ticket, items: Vec<T>) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.phase = Phase::Loaded(items);
        true
    }

    /// Returns whether the transition was applied.
    pub fn reject(&mut self, ticket: Ticket, message: impl Into<String>) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.phase = Phase::Failed(message.into());
        true
    }

    pub fn settle<E: fmt::Display>(&mut self, ticket: Ticket, result: Result<Vec<T>, E>) -> bool {
        match result {
            Ok(items) => self.resolve(ticket, items),
            Err(err) => self.reject(ticket, err.to_string()),
        }
    }

    /// Marks the lifecycle discarded. Returns the ticket if a request was still in flight.
    pub fn teardown(&mut self) -> Option<Ticket> {
        let in_flight = if self.is_pending() { self.ticket } else { None };
        self.discarded = true;
        in_flight
    }

    pub fn snapshot(&self) -> FetchState<T> {
        match &self.phase {
            Phase::Idle => FetchState::default(),
            Phase::Loading => FetchState {
                items: Vec::new(),
                is_loading: true,
                error: None,
            },
            Phase::Loaded(items) => FetchState {
                items: items.clone(),
                is_loading: false,
                error: None,
            },
            Phase::Failed(message) => FetchState {
                items: Vec::new(),
                is_loading: false,
                error: Some(message.clone()),
            },
        }
    }

    fn accepts(&self, ticket: Ticket) -> bool {
        !self.discarded && self.is_loading() && self.ticket == Some(ticket)
    }
}
