use std::sync::{Arc, Mutex};
use std::time::Duration;

use mailmorph_client::{
    Backend, EngineEvent, EngineHandle, ExtractOptions, RequestError, RequestSettings,
};
use mailmorph_core::{
    update, AppState, Effect, ExtractionResult, LogRecord, MetricRecord, Msg, ViewKind,
};
use serde_json::json;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct FakeBackend {
    delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Backend for FakeBackend {
    async fn extract(
        &self,
        text: &str,
        options: &ExtractOptions,
    ) -> Result<ExtractionResult, RequestError> {
        self.calls.lock().unwrap().push(format!(
            "extract:{text}:{:?}:{:?}",
            options.max_words, options.base_url
        ));
        tokio::time::sleep(self.delay).await;
        Ok(ExtractionResult::from_value(json!({ "echo": text })).unwrap())
    }

    async fn fetch_metrics(&self, base_url: Option<&str>) -> Result<Vec<MetricRecord>, RequestError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("metrics:{base_url:?}"));
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }

    async fn fetch_logs(&self, _base_url: Option<&str>) -> Result<Vec<LogRecord>, RequestError> {
        self.calls.lock().unwrap().push("logs".to_string());
        tokio::time::sleep(self.delay).await;
        Err(RequestError::HttpStatus { status: 500 })
    }
}

#[test]
fn engine_runs_effects_and_reports_results() {
    let backend = Arc::new(FakeBackend::default());
    let settings = RequestSettings {
        base_url: Some("http://backend.test".to_string()),
        max_words: Some(4),
    };
    let engine = EngineHandle::new(backend.clone(), settings).unwrap();

    engine.dispatch(Effect::Extract {
        ticket: 1,
        text: "hello".to_string(),
    });
    let event = engine.recv_timeout(WAIT).expect("extraction event");

    assert_eq!(
        event,
        EngineEvent::ExtractionSettled {
            ticket: 1,
            result: Ok(ExtractionResult::from_value(json!({ "echo": "hello" })).unwrap()),
        }
    );
    assert_eq!(
        backend.calls(),
        vec!["extract:hello:Some(4):Some(\"http://backend.test\")".to_string()]
    );
    assert_eq!(engine.in_flight_count(), 0);
}

#[test]
fn engine_errors_become_message_text() {
    let engine = EngineHandle::new(Arc::new(FakeBackend::default()), RequestSettings::default())
        .unwrap();

    engine.dispatch(Effect::FetchLogs { ticket: 9 });
    let msg = engine.recv_timeout(WAIT).expect("logs event").into_msg();

    assert_eq!(
        msg,
        Msg::LogsSettled {
            ticket: 9,
            result: Err("HTTP 500".to_string()),
        }
    );
}

#[test]
fn discarded_ticket_result_is_dropped() {
    let backend = Arc::new(FakeBackend::with_delay(Duration::from_millis(100)));
    let engine = EngineHandle::new(backend.clone(), RequestSettings::default()).unwrap();

    engine.dispatch(Effect::FetchMetrics { ticket: 3 });
    engine.dispatch(Effect::Discard { ticket: 3 });
    assert_eq!(engine.in_flight_count(), 0);

    assert!(engine.recv_timeout(Duration::from_millis(500)).is_none());
    // The request itself still ran to completion.
    assert_eq!(backend.calls(), vec!["metrics:None".to_string()]);
}

#[test]
fn state_machine_round_trip_through_engine() {
    let engine = EngineHandle::new(Arc::new(FakeBackend::default()), RequestSettings::default())
        .unwrap();

    let (state, effects) = update(AppState::new(), Msg::ViewMounted(ViewKind::Metrics));
    assert!(state.view().metrics.is_loading);
    for effect in effects {
        engine.dispatch(effect);
    }

    let msg = engine.recv_timeout(WAIT).expect("metrics event").into_msg();
    let (state, _) = update(state, msg);

    let view = state.view();
    assert!(!view.metrics.is_loading);
    assert_eq!(view.metrics.error, None);
    assert!(view.metrics.items.is_empty());
}
