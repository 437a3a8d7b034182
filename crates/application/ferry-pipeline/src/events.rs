//! Run-event reporting.
//!
//! The orchestrator reports progress and failures through an [`EventSink`] so
//! a host can route them to its own log. [`TracingSink`] forwards to `tracing`,
//! [`MemorySink`] records events for inspection.

use std::fmt;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

pub trait EventSink: Send + Sync {
    fn log(&self, tag: &str, message: &str, severity: Severity);
}

/// Forwards events to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn log(&self, tag: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(target: "ferry::events", tag, "{}", message),
            Severity::Warning => tracing::warn!(target: "ferry::events", tag, "{}", message),
            Severity::Error => tracing::error!(target: "ferry::events", tag, "{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub tag: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn errors(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.severity == Severity::Error)
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.events().iter().any(|e| e.message.contains(needle))
    }
}

impl EventSink for MemorySink {
    fn log(&self, tag: &str, message: &str, severity: Severity) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Event {
                tag: tag.to_string(),
                message: message.to_string(),
                severity,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.log("ferry", "first", Severity::Info);
        sink.log("ferry", "boom", Severity::Error);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "first");
        assert_eq!(sink.errors().len(), 1);
        assert!(sink.contains("boom"));
    }
}
