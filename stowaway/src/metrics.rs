//! Metrics declaration and recording.
//!
//! Everything here compiles to no-ops unless the `metrics` feature is on.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

use crate::{CacheStatus, Route};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Requests per route decision.
    pub static ref ROUTE_DECISIONS: &'static str = {
        metrics::describe_counter!(
            "stowaway_route_decisions_total",
            "Total number of intercepted requests per route."
        );
        "stowaway_route_decisions_total"
    };
    /// Responses per cache status.
    pub static ref CACHE_STATUS: &'static str = {
        metrics::describe_counter!(
            "stowaway_cache_status_total",
            "Total number of responses per cache status."
        );
        "stowaway_cache_status_total"
    };
    /// Network failures answered from a store or with a synthesized response.
    pub static ref OFFLINE_FALLBACKS: &'static str = {
        metrics::describe_counter!(
            "stowaway_offline_fallbacks_total",
            "Total number of network failures served by a fallback."
        );
        "stowaway_offline_fallbacks_total"
    };
    /// Background cache writes that failed.
    pub static ref FAILED_WRITES: &'static str = {
        metrics::describe_counter!(
            "stowaway_failed_writes_total",
            "Total number of failed background cache writes."
        );
        "stowaway_failed_writes_total"
    };
    /// Store lookups that failed and were treated as misses.
    pub static ref FAILED_LOOKUPS: &'static str = {
        metrics::describe_counter!(
            "stowaway_failed_lookups_total",
            "Total number of store lookups that failed."
        );
        "stowaway_failed_lookups_total"
    };

    // Offload manager metrics

    /// Track number of offload tasks spawned.
    pub static ref OFFLOAD_TASKS_SPAWNED: &'static str = {
        metrics::describe_counter!(
            "stowaway_offload_tasks_spawned_total",
            "Total number of offload tasks spawned."
        );
        "stowaway_offload_tasks_spawned_total"
    };
    /// Track number of offload tasks completed.
    pub static ref OFFLOAD_TASKS_COMPLETED: &'static str = {
        metrics::describe_counter!(
            "stowaway_offload_tasks_completed_total",
            "Total number of offload tasks completed."
        );
        "stowaway_offload_tasks_completed_total"
    };
    /// Track number of offload tasks cancelled by timeout.
    pub static ref OFFLOAD_TASKS_TIMEOUT: &'static str = {
        metrics::describe_counter!(
            "stowaway_offload_tasks_timeout_total",
            "Total number of offload tasks cancelled due to timeout."
        );
        "stowaway_offload_tasks_timeout_total"
    };
    /// Gauge of currently running offload tasks.
    pub static ref OFFLOAD_TASKS_ACTIVE: &'static str = {
        metrics::describe_gauge!(
            "stowaway_offload_tasks_active",
            "Number of currently active offload tasks."
        );
        "stowaway_offload_tasks_active"
    };
    /// Histogram of offload task duration.
    pub static ref OFFLOAD_TASK_DURATION: &'static str = {
        metrics::describe_histogram!(
            "stowaway_offload_task_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of offload tasks in seconds."
        );
        "stowaway_offload_task_duration_seconds"
    };
}

/// Records the route and the resulting cache status of a request.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_routed(route: Route, status: CacheStatus) {
    metrics::counter!(*ROUTE_DECISIONS, "route" => route.as_str()).increment(1);
    metrics::counter!(*CACHE_STATUS, "status" => status.as_str(), "route" => route.as_str())
        .increment(1);
    if matches!(status, CacheStatus::Stale | CacheStatus::Offline) {
        metrics::counter!(*OFFLINE_FALLBACKS, "route" => route.as_str()).increment(1);
    }
}

/// Records the route and the resulting cache status of a request.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_routed(_route: Route, _status: CacheStatus) {}

/// Records a failed background write.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_failed_write(store: &str) {
    metrics::counter!(*FAILED_WRITES, "store" => store.to_string()).increment(1);
}

/// Records a failed background write.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_failed_write(_store: &str) {}

/// Records a failed store lookup.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_failed_lookup(store: &str) {
    metrics::counter!(*FAILED_LOOKUPS, "store" => store.to_string()).increment(1);
}

/// Records a failed store lookup.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_failed_lookup(_store: &str) {}
