use std::io;
use std::sync::Arc;
use std::time::Duration;

use mailmorph_client::{Backend, EngineEvent, EngineHandle, RequestSettings};
use mailmorph_core::{Effect, Msg};
use mailmorph_logging::{mm_debug, mm_info, mm_warn};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(backend: Arc<dyn Backend>, settings: RequestSettings) -> io::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(backend, settings)?,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match &effect {
                Effect::Extract { ticket, text } => {
                    mm_info!("Extract ticket={} text_len={}", ticket, text.len());
                }
                Effect::FetchMetrics { ticket } => mm_info!("FetchMetrics ticket={}", ticket),
                Effect::FetchLogs { ticket } => mm_info!("FetchLogs ticket={}", ticket),
                Effect::Discard { ticket } => mm_debug!("Discard ticket={}", ticket),
            }
            self.engine.dispatch(effect);
        }
    }

    /// Waits up to `timeout` for the next settled request.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        log_failure(&event);
        Some(event.into_msg())
    }
}

fn log_failure(event: &EngineEvent) {
    let failure = match event {
        EngineEvent::ExtractionSettled { result: Err(err), .. } => Some(err),
        EngineEvent::MetricsSettled { result: Err(err), .. } => Some(err),
        EngineEvent::LogsSettled { result: Err(err), .. } => Some(err),
        _ => None,
    };
    if let Some(err) = failure {
        mm_warn!("Ticket {} failed: {}", event.ticket(), err);
    }
}
