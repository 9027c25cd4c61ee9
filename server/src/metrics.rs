//! Server metrics.

use metriken::{metric, Counter, Gauge};

#[metric(
    name = "connections_accepted",
    description = "Total number of connections accepted"
)]
pub static CONNECTIONS_ACCEPTED: Counter = Counter::new();

#[metric(
    name = "connections_active",
    description = "Number of currently active connections"
)]
pub static CONNECTIONS_ACTIVE: Gauge = Gauge::new();

#[metric(name = "string_gets", description = "Total GET operations")]
pub static GETS: Counter = Counter::new();

#[metric(name = "string_sets", description = "Total SET operations")]
pub static SETS: Counter = Counter::new();

#[metric(name = "string_deletes", description = "Total DEL operations")]
pub static DELETES: Counter = Counter::new();

#[metric(
    name = "set_single_key_ops",
    description = "Total single-key set operations (SADD, SREM, SPOP, ...)"
)]
pub static SET_SINGLE_KEY_OPS: Counter = Counter::new();

#[metric(
    name = "set_multi_key_ops",
    description = "Total multi-key set operations (SINTER, SUNION, SDIFF families)"
)]
pub static SET_MULTI_KEY_OPS: Counter = Counter::new();

#[metric(
    name = "wrongtype_errors",
    description = "Commands rejected for operating on the wrong value type"
)]
pub static WRONGTYPE_ERRORS: Counter = Counter::new();

#[metric(name = "protocol_errors", description = "Total protocol parse errors")]
pub static PROTOCOL_ERRORS: Counter = Counter::new();
