//! The keyspace: typed values owned by keys, plus the bookkeeping every
//! mutation carries (dirty counter, modified-key signal, keyspace events).
//!
//! A `Db` is a single logical database instance. Commands run against it to
//! completion, one at a time, so no interior locking is needed here; the
//! listener serializes access.

use ahash::RandomState;
use std::collections::HashMap;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::events::{EventClass, EventSink, NullSink};
use crate::set::Set;

/// A typed value reachable from a key.
#[derive(Debug, Clone)]
pub enum Object {
    Set(Set),
    String(Box<[u8]>),
}

impl Object {
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Set(_) => "set",
            Object::String(_) => "string",
        }
    }
}

/// A single logical database.
pub struct Db {
    map: HashMap<Box<[u8]>, Object, RandomState>,
    events: Box<dyn EventSink>,
    dirty: u64,
    max_intset_entries: usize,
}

impl Db {
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_sink(config, Box::new(NullSink))
    }

    pub fn with_sink(config: &StoreConfig, events: Box<dyn EventSink>) -> Self {
        Self {
            map: HashMap::default(),
            events,
            dirty: 0,
            max_intset_entries: config.set_max_intset_entries,
        }
    }

    /// Intset length bound used by every set insert on this database.
    #[inline]
    pub fn max_intset_entries(&self) -> usize {
        self.max_intset_entries
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.map.contains_key(key)
    }

    /// Iterate the keys currently present. Order is unspecified.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.map.keys().map(|k| k.as_ref())
    }

    pub fn lookup(&self, key: &[u8]) -> Option<&Object> {
        self.map.get(key)
    }

    pub fn lookup_mut(&mut self, key: &[u8]) -> Option<&mut Object> {
        self.map.get_mut(key)
    }

    /// Look up a key expecting a set. `Ok(None)` when the key is missing.
    pub fn get_set(&self, key: &[u8]) -> StoreResult<Option<&Set>> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Object::Set(set)) => Ok(Some(set)),
            Some(_) => Err(StoreError::WrongType),
        }
    }

    /// Mutable variant of [`Db::get_set`].
    pub fn get_set_mut(&mut self, key: &[u8]) -> StoreResult<Option<&mut Set>> {
        match self.map.get_mut(key) {
            None => Ok(None),
            Some(Object::Set(set)) => Ok(Some(set)),
            Some(_) => Err(StoreError::WrongType),
        }
    }

    /// Look up a key expecting a set, creating an empty one sized for
    /// `first` when the key is missing.
    pub fn get_or_create_set(&mut self, key: &[u8], first: &[u8]) -> StoreResult<&mut Set> {
        let entry = self
            .map
            .entry(key.into())
            .or_insert_with(|| Object::Set(Set::for_value(first)));
        match entry {
            Object::Set(set) => Ok(set),
            _ => Err(StoreError::WrongType),
        }
    }

    /// Insert or overwrite a key.
    pub fn insert(&mut self, key: &[u8], object: Object) {
        self.map.insert(key.into(), object);
    }

    /// Remove a key, returning whether it existed.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        self.map.remove(key).is_some()
    }

    /// Remove a key and hand back its value.
    pub fn take(&mut self, key: &[u8]) -> Option<Object> {
        self.map.remove(key)
    }

    /// Publish a keyspace event.
    pub fn notify(&mut self, class: EventClass, name: &str, key: &[u8]) {
        self.events.notify(class, name, key);
    }

    /// Signal that a key's value changed. Watchers are an external
    /// collaborator; the seam is kept observable through tracing.
    pub fn signal_modified(&mut self, key: &[u8]) {
        tracing::trace!(key = %String::from_utf8_lossy(key), "key modified");
    }

    /// Process-wide mutation counter, observed by persistence.
    #[inline]
    pub fn dirty(&self) -> u64 {
        self.dirty
    }

    pub fn add_dirty(&mut self, n: u64) {
        self.dirty += n;
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("keys", &self.map.len())
            .field("dirty", &self.dirty)
            .field("max_intset_entries", &self.max_intset_entries)
            .finish()
    }
}
