//! Event publication.
//!
//! Transactions publish `step`, `step_succeeded` and `step_failed` events
//! to an [`EventSink`]. A transaction uses its own sink when one was given
//! to the builder, and the global sink otherwise.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use parking_lot::RwLock;
use std::sync::Arc;

/// Published before a step runs.
pub const STEP: &str = "step";
/// Published after a step returns `Success`.
pub const STEP_SUCCEEDED: &str = "step_succeeded";
/// Published after a step returns `Failure`.
pub const STEP_FAILED: &str = "step_failed";

static GLOBAL_EVENT_SINK: RwLock<Option<Arc<dyn EventSink>>> = RwLock::new(None);

/// Sets the global event sink.
pub fn set_event_sink(sink: Arc<dyn EventSink>) {
    *GLOBAL_EVENT_SINK.write() = Some(sink);
}

/// Clears the global event sink.
pub fn clear_event_sink() {
    *GLOBAL_EVENT_SINK.write() = None;
}

/// Gets the global event sink.
///
/// Returns a [`NoOpEventSink`] if no sink is set.
pub fn get_event_sink() -> Arc<dyn EventSink> {
    GLOBAL_EVENT_SINK
        .read()
        .clone()
        .unwrap_or_else(|| Arc::new(NoOpEventSink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_global_sink_roundtrip() {
        let sink = Arc::new(CollectingEventSink::new());
        set_event_sink(sink.clone());
        get_event_sink().try_emit(STEP, json!({"step_name": "global_sink_set"}));
        clear_event_sink();
        get_event_sink().try_emit(STEP, json!({"step_name": "global_sink_cleared"}));

        let payloads = sink.payloads(STEP);
        assert!(payloads.contains(&json!({"step_name": "global_sink_set"})));
        assert!(!payloads.contains(&json!({"step_name": "global_sink_cleared"})));
    }
}
