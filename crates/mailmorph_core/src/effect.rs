use crate::Ticket;

/// Work the host must perform after an [`update`](crate::update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Extract { ticket: Ticket, text: String },
    FetchMetrics { ticket: Ticket },
    FetchLogs { ticket: Ticket },
    /// The view that issued `ticket` is gone; its result should be dropped.
    Discard { ticket: Ticket },
}
