//! Keyspace event publication.
//!
//! Commands that mutate state publish a named event against the key they
//! touched. The sink is pluggable: the server wires in a tracing-backed
//! sink, tests use [`RecordingSink`] to assert on the exact sequence.

use parking_lot::Mutex;
use std::sync::Arc;

/// Event class, mirroring the notification flag the event was filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    /// Set-type events: sadd, srem, spop, *store.
    Set,
    /// Generic keyspace events: del.
    Generic,
}

/// A published keyspace event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub class: EventClass,
    pub name: String,
    pub key: Vec<u8>,
}

/// Consumer of keyspace events.
pub trait EventSink: Send {
    fn notify(&mut self, class: EventClass, name: &str, key: &[u8]);
}

/// Sink that drops every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&mut self, _class: EventClass, _name: &str, _key: &[u8]) {}
}

/// Sink that records events for later inspection. Clones share the same
/// buffer, so a handle kept outside the keyspace sees everything published
/// through it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for RecordingSink {
    fn notify(&mut self, class: EventClass, name: &str, key: &[u8]) {
        self.events.lock().push(Event {
            class,
            name: name.to_string(),
            key: key.to_vec(),
        });
    }
}
