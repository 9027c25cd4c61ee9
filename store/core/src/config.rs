//! Store configuration.

use serde::Deserialize;

/// Default bound on intset-encoded set length.
pub const DEFAULT_MAX_INTSET_ENTRIES: usize = 512;

/// Tunables for the storage layer, loaded from the `[store]` section of the
/// server configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Intset length above which a set is promoted to the hash encoding on
    /// insert.
    #[serde(default = "default_max_intset_entries")]
    pub set_max_intset_entries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            set_max_intset_entries: DEFAULT_MAX_INTSET_ENTRIES,
        }
    }
}

fn default_max_intset_entries() -> usize {
    DEFAULT_MAX_INTSET_ENTRIES
}
