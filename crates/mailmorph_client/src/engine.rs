use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use mailmorph_core::{Effect, ExtractionResult, LogRecord, MetricRecord, Msg, Ticket};
use mailmorph_logging::{mm_debug, mm_info};

use crate::{Backend, ExtractOptions, RequestError};

/// Overrides applied to every request the engine issues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSettings {
    pub base_url: Option<String>,
    pub max_words: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ExtractionSettled {
        ticket: Ticket,
        result: Result<ExtractionResult, RequestError>,
    },
    MetricsSettled {
        ticket: Ticket,
        result: Result<Vec<MetricRecord>, RequestError>,
    },
    LogsSettled {
        ticket: Ticket,
        result: Result<Vec<LogRecord>, RequestError>,
    },
}

impl EngineEvent {
    pub fn ticket(&self) -> Ticket {
        match self {
            EngineEvent::ExtractionSettled { ticket, .. }
            | EngineEvent::MetricsSettled { ticket, .. }
            | EngineEvent::LogsSettled { ticket, .. } => *ticket,
        }
    }

    /// Converts to the core message; errors become their display text.
    pub fn into_msg(self) -> Msg {
        match self {
            EngineEvent::ExtractionSettled { ticket, result } => Msg::ExtractionSettled {
                ticket,
                result: result.map_err(|err| err.to_string()),
            },
            EngineEvent::MetricsSettled { ticket, result } => Msg::MetricsSettled {
                ticket,
                result: result.map_err(|err| err.to_string()),
            },
            EngineEvent::LogsSettled { ticket, result } => Msg::LogsSettled {
                ticket,
                result: result.map_err(|err| err.to_string()),
            },
        }
    }
}

enum EngineCommand {
    Extract { ticket: Ticket, text: String },
    FetchMetrics { ticket: Ticket },
    FetchLogs { ticket: Ticket },
}

/// In-flight tickets; `true` once the owning view has gone away.
type InFlight = Arc<Mutex<HashMap<Ticket, bool>>>;

/// Runs request effects on a background runtime and hands results back over a channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    in_flight: InFlight,
}

impl EngineHandle {
    pub fn new(backend: Arc<dyn Backend>, settings: RequestSettings) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let in_flight: InFlight = Arc::new(Mutex::new(HashMap::new()));
        let runtime = tokio::runtime::Runtime::new()?;
        let settings = Arc::new(settings);

        let worker_in_flight = in_flight.clone();
        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let backend = backend.clone();
                let settings = settings.clone();
                let event_tx = event_tx.clone();
                let in_flight = worker_in_flight.clone();
                runtime.spawn(async move {
                    let event = handle_command(backend.as_ref(), &settings, command).await;
                    deliver(&in_flight, &event_tx, event);
                });
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            in_flight,
        })
    }

    /// Starts the request an effect asks for, or marks its ticket discarded.
    pub fn dispatch(&self, effect: Effect) {
        let command = match effect {
            Effect::Extract { ticket, text } => EngineCommand::Extract { ticket, text },
            Effect::FetchMetrics { ticket } => EngineCommand::FetchMetrics { ticket },
            Effect::FetchLogs { ticket } => EngineCommand::FetchLogs { ticket },
            Effect::Discard { ticket } => {
                self.discard(ticket);
                return;
            }
        };
        let ticket = command_ticket(&command);
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.insert(ticket, false);
        }
        let _ = self.cmd_tx.send(command);
    }

    /// The request keeps running; its result is dropped instead of delivered.
    pub fn discard(&self, ticket: Ticket) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            if let Some(discarded) = in_flight.get_mut(&ticket) {
                *discarded = true;
                mm_debug!("ticket {} marked discarded", ticket);
            }
        }
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight
            .lock()
            .map(|in_flight| in_flight.values().filter(|discarded| !**discarded).count())
            .unwrap_or(0)
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn command_ticket(command: &EngineCommand) -> Ticket {
    match command {
        EngineCommand::Extract { ticket, .. }
        | EngineCommand::FetchMetrics { ticket }
        | EngineCommand::FetchLogs { ticket } => *ticket,
    }
}

async fn handle_command(
    backend: &dyn Backend,
    settings: &RequestSettings,
    command: EngineCommand,
) -> EngineEvent {
    let base_url = settings.base_url.as_deref();
    match command {
        EngineCommand::Extract { ticket, text } => {
            let options = ExtractOptions {
                max_words: settings.max_words,
                base_url: settings.base_url.clone(),
            };
            let result = backend.extract(&text, &options).await;
            EngineEvent::ExtractionSettled { ticket, result }
        }
        EngineCommand::FetchMetrics { ticket } => {
            let result = backend.fetch_metrics(base_url).await;
            EngineEvent::MetricsSettled { ticket, result }
        }
        EngineCommand::FetchLogs { ticket } => {
            let result = backend.fetch_logs(base_url).await;
            EngineEvent::LogsSettled { ticket, result }
        }
    }
}

fn deliver(in_flight: &InFlight, event_tx: &mpsc::Sender<EngineEvent>, event: EngineEvent) {
    let ticket = event.ticket();
    let discarded = in_flight
        .lock()
        .ok()
        .and_then(|mut in_flight| in_flight.remove(&ticket))
        .unwrap_or(false);
    if discarded {
        mm_info!("dropping result for discarded ticket {}", ticket);
        return;
    }
    let _ = event_tx.send(event);
}
