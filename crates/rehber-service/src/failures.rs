//! Counters for failures the API deliberately swallows.
//!
//! Usage pings, push dispatch and read paths never fail the caller. Each
//! swallowed failure is logged and counted here so it stays visible in the
//! admin stats.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Swallowed-failure counters shared across handlers.
#[derive(Debug, Default)]
pub struct FailureCounters {
    usage_events: AtomicU64,
    push_dispatch: AtomicU64,
    read_fallbacks: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureSnapshot {
    /// Usage events that could not be written.
    pub usage_events: u64,
    /// Notifications the push dispatcher failed on.
    pub push_dispatch: u64,
    /// Reads answered with a fallback value.
    pub read_fallbacks: u64,
}

impl FailureCounters {
    /// Count a dropped usage event.
    pub fn record_usage_event(&self) {
        self.usage_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed push dispatch.
    pub fn record_push_dispatch(&self) {
        self.push_dispatch.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a read served from fallback data.
    pub fn record_read_fallback(&self) {
        self.read_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    #[must_use]
    pub fn snapshot(&self) -> FailureSnapshot {
        FailureSnapshot {
            usage_events: self.usage_events.load(Ordering::Relaxed),
            push_dispatch: self.push_dispatch.load(Ordering::Relaxed),
            read_fallbacks: self.read_fallbacks.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent() {
        let counters = FailureCounters::default();
        counters.record_usage_event();
        counters.record_usage_event();
        counters.record_read_fallback();

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.usage_events, 2);
        assert_eq!(snapshot.push_dispatch, 0);
        assert_eq!(snapshot.read_fallbacks, 1);
    }
}
