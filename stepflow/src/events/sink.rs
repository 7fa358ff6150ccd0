//! Event sink trait and implementations.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, trace, warn, Level};

/// Receives the events a transaction publishes while it runs.
///
/// Sinks must not fail the transaction: errors are swallowed inside the
/// sink.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publishes an event.
    async fn emit(&self, event: &str, payload: Value);

    /// Publishes an event without awaiting.
    fn try_emit(&self, event: &str, payload: Value);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: &str, _payload: Value) {}

    fn try_emit(&self, _event: &str, _payload: Value) {}
}

/// Logs events through `tracing`.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a sink logging at `level`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// The level events are logged at.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    fn log_event(&self, event: &str, payload: &Value) {
        match self.level {
            Level::TRACE => trace!(event = %event, payload = %payload, "Transaction event"),
            Level::DEBUG => debug!(event = %event, payload = %payload, "Transaction event"),
            Level::WARN | Level::ERROR => {
                warn!(event = %event, payload = %payload, "Transaction event");
            }
            _ => info!(event = %event, payload = %payload, "Transaction event"),
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: &str, payload: Value) {
        self.log_event(event, &payload);
    }

    fn try_emit(&self, event: &str, payload: Value) {
        self.log_event(event, &payload);
    }
}

/// Keeps every event in memory, in publication order.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<(String, Value)>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.read().clone()
    }

    /// Returns the payloads of events with exactly this name.
    #[must_use]
    pub fn payloads(&self, event: &str) -> Vec<Value> {
        self.events
            .read()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Returns the event names, in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.events.read().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears the collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: &str, payload: Value) {
        self.try_emit(event, payload);
    }

    fn try_emit(&self, event: &str, payload: Value) {
        self.events.write().push((event.to_string(), payload));
    }
}
