//! Metrics collection module
//!
//! Tracks search volume, outcomes and latency per model tier.

use crate::gateway::ModelTier;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one tier
#[derive(Debug, Default)]
struct TierCounters {
    searches: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    /// Sum of latencies of resolved searches, in ms
    total_latency_ms: AtomicU64,
}

impl TierCounters {
    fn snapshot(&self) -> TierStats {
        let successes = self.successes.load(Ordering::Relaxed);
        let failures = self.failures.load(Ordering::Relaxed);
        let resolved = successes + failures;
        let total = self.total_latency_ms.load(Ordering::Relaxed);

        TierStats {
            searches: self.searches.load(Ordering::Relaxed),
            successes,
            failures,
            avg_response_time_ms: if resolved == 0 {
                None
            } else {
                Some(total / resolved)
            },
            reliability: if resolved == 0 {
                100.0
            } else {
                (successes as f64 / resolved as f64) * 100.0
            },
        }
    }
}

/// Process-wide metrics collector
#[derive(Debug, Default)]
pub struct Metrics {
    fast: TierCounters,
    deep: TierCounters,
    /// Responses that arrived after being superseded by a newer submit or a reset
    stale_discarded: AtomicU64,
    resets: AtomicU64,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    fn tier(&self, tier: ModelTier) -> &TierCounters {
        match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Deep => &self.deep,
        }
    }

    /// Record an accepted submission
    pub fn record_search(&self, tier: ModelTier) {
        self.tier(tier).searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful search that was applied to state
    pub fn record_success(&self, tier: ModelTier, time_ms: u64) {
        let counters = self.tier(tier);
        counters.successes.fetch_add(1, Ordering::Relaxed);
        counters.total_latency_ms.fetch_add(time_ms, Ordering::Relaxed);
    }

    /// Record a failed search that was applied to state
    pub fn record_failure(&self, tier: ModelTier, time_ms: u64) {
        let counters = self.tier(tier);
        counters.failures.fetch_add(1, Ordering::Relaxed);
        counters.total_latency_ms.fetch_add(time_ms, Ordering::Relaxed);
    }

    /// Record a response dropped because its token was superseded
    pub fn record_stale(&self) {
        self.stale_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Total accepted submissions across tiers
    pub fn total_searches(&self) -> u64 {
        self.fast.searches.load(Ordering::Relaxed) + self.deep.searches.load(Ordering::Relaxed)
    }

    pub fn stale_discarded(&self) -> u64 {
        self.stale_discarded.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_searches: self.total_searches(),
            fast: self.fast.snapshot(),
            deep: self.deep.snapshot(),
            stale_discarded: self.stale_discarded(),
            resets: self.resets.load(Ordering::Relaxed),
        }
    }
}

/// Statistics for a single tier
#[derive(Debug, Clone, Serialize)]
pub struct TierStats {
    pub searches: u64,
    pub successes: u64,
    pub failures: u64,
    pub avg_response_time_ms: Option<u64>,
    pub reliability: f64,
}

/// Serializable view of [`Metrics`]
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_searches: u64,
    pub fast: TierStats,
    pub deep: TierStats,
    pub stale_discarded: u64,
    pub resets: u64,
}
