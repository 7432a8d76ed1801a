//! Metrics for the PIR server
//!
//! Privacy-safe metrics: only outcome labels, never keys, slots or shard
//! indices. Recorded through the `metrics` facade; whoever embeds the server
//! installs a recorder.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

pub const OUTCOME_OK: &str = "ok";
pub const OUTCOME_CLIENT_ERROR: &str = "client_error";
pub const OUTCOME_SERVER_ERROR: &str = "server_error";

pub fn record_query(outcome: &str, duration: Duration) {
    counter!("pir_queries_total", "outcome" => outcome.to_string()).increment(1);
    histogram!("pir_query_duration_seconds", "outcome" => outcome.to_string())
        .record(duration.as_secs_f64());
}

pub fn record_inserts(count: usize) {
    counter!("pir_inserts_total").increment(count as u64);
}

pub fn set_shards_materialized(count: usize) {
    gauge!("pir_shards_materialized").set(count as f64);
}
