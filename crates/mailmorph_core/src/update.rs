use crate::{AppState, Effect, Msg, Notice};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::ExtractSubmitted => {
            if state.input().trim().is_empty() {
                state.set_notice(Some(Notice::EmptyInput));
                return (state, Vec::new());
            }
            // Re-submission while a request is outstanding is dropped.
            if state.extraction().is_pending() {
                return (state, Vec::new());
            }
            state.set_notice(None);
            vec![state.begin_extraction()]
        }
        Msg::ViewMounted(kind) => state.mount(kind),
        Msg::ViewUnmounted(kind) => state
            .unmount(kind)
            .map(|ticket| vec![Effect::Discard { ticket }])
            .unwrap_or_default(),
        Msg::ExtractionSettled { ticket, result } => {
            state.apply_extraction(ticket, result);
            Vec::new()
        }
        Msg::MetricsSettled { ticket, result } => {
            state.apply_metrics(ticket, result);
            Vec::new()
        }
        Msg::LogsSettled { ticket, result } => {
            state.apply_logs(ticket, result);
            Vec::new()
        }
        Msg::NoticeDismissed => {
            state.set_notice(None);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
