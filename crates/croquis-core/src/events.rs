//! Event log contract for user-interaction telemetry.
//!
//! The editor emits fire-and-forget records through [`EventSink`]; the
//! absence of a sink never affects control flow.

use std::cell::RefCell;

/// A single event emission. Borrowed view; sinks that retain events convert
/// to [`LoggedEvent`].
#[derive(Debug, Clone, Copy)]
pub struct EventRecord<'a> {
    pub event: &'a str,
    pub tool: Option<&'a str>,
    pub item_kind: Option<&'a str>,
    pub notes: Option<&'a str>,
}

impl<'a> EventRecord<'a> {
    pub fn new(event: &'a str) -> Self {
        Self {
            event,
            tool: None,
            item_kind: None,
            notes: None,
        }
    }

    pub fn tool(mut self, tool: &'a str) -> Self {
        self.tool = Some(tool);
        self
    }

    pub fn item_kind(mut self, kind: &'a str) -> Self {
        self.item_kind = Some(kind);
        self
    }

    pub fn notes(mut self, notes: &'a str) -> Self {
        self.notes = Some(notes);
        self
    }
}

/// Receives event records. Implementations must not fail the caller.
pub trait EventSink {
    fn log(&self, record: EventRecord<'_>);
}

/// Owned copy of an [`EventRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedEvent {
    pub event: String,
    pub tool: Option<String>,
    pub item_kind: Option<String>,
    pub notes: Option<String>,
}

impl From<EventRecord<'_>> for LoggedEvent {
    fn from(record: EventRecord<'_>) -> Self {
        Self {
            event: record.event.to_string(),
            tool: record.tool.map(str::to_string),
            item_kind: record.item_kind.map(str::to_string),
            notes: record.notes.map(str::to_string),
        }
    }
}

/// In-memory sink that records everything it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RefCell<Vec<LoggedEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all recorded events, in emission order.
    pub fn snapshot(&self) -> Vec<LoggedEvent> {
        self.events.borrow().clone()
    }

    /// Event names only, in emission order.
    pub fn names(&self) -> Vec<String> {
        self.events.borrow().iter().map(|e| e.event.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl EventSink for MemorySink {
    fn log(&self, record: EventRecord<'_>) {
        self.events.borrow_mut().push(record.into());
    }
}
