use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;

/// Traffic counters shared across all gateway calls.
///
/// Owned explicitly and injected through the builder, never a global.
/// Counters use relaxed atomics; the per-provider map sits behind a short
/// critical section.
#[derive(Debug, Default)]
pub struct GatewayStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failovers: AtomicU64,
    provider_usage: Mutex<HashMap<String, u64>>,
}

/// Serializable view of [`GatewayStats`] at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failovers: u64,
    /// `successful / total`, or 0.0 before any traffic.
    pub success_rate: f64,
    pub provider_usage: HashMap<String, u64>,
}

impl GatewayStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `name` shows up in snapshots even before its first success.
    pub fn register_provider(&self, name: &str) {
        let mut usage = self.provider_usage.lock().unwrap_or_else(|p| p.into_inner());
        usage.entry(name.to_string()).or_insert(0);
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self, provider: &str) {
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        let mut usage = self.provider_usage.lock().unwrap_or_else(|p| p.into_inner());
        *usage.entry(provider.to_string()).or_insert(0) += 1;
    }

    pub fn record_failover(&self) {
        self.failovers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let total = self.total_requests.load(Ordering::Relaxed);
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let usage = self.provider_usage.lock().unwrap_or_else(|p| p.into_inner());
        StatsSnapshot {
            total_requests: total,
            successful_requests: successful,
            failovers: self.failovers.load(Ordering::Relaxed),
            success_rate: if total == 0 {
                0.0
            } else {
                successful as f64 / total as f64
            },
            provider_usage: usage.clone(),
        }
    }

    /// Zero every counter; registered provider names are kept.
    pub fn reset(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.successful_requests.store(0, Ordering::Relaxed);
        self.failovers.store(0, Ordering::Relaxed);
        let mut usage = self.provider_usage.lock().unwrap_or_else(|p| p.into_inner());
        for count in usage.values_mut() {
            *count = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counts_accumulate() {
        let stats = GatewayStats::new();
        stats.record_request();
        stats.record_request();
        stats.record_success("local");
        stats.record_failover();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.successful_requests, 1);
        assert_eq!(snapshot.failovers, 1);
        assert_eq!(snapshot.success_rate, 0.5);
        assert_eq!(snapshot.provider_usage.get("local"), Some(&1));
    }

    #[test]
    fn test_success_rate_defined_without_traffic() {
        let stats = GatewayStats::new();
        assert_eq!(stats.snapshot().success_rate, 0.0);
    }

    #[test]
    fn test_registered_providers_appear_as_zero() {
        let stats = GatewayStats::new();
        stats.register_provider("idle");
        assert_eq!(stats.snapshot().provider_usage.get("idle"), Some(&0));
    }

    #[test]
    fn test_reset_keeps_registered_names() {
        let stats = GatewayStats::new();
        stats.register_provider("local");
        stats.record_request();
        stats.record_success("local");
        stats.reset();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.successful_requests, 0);
        assert_eq!(snapshot.provider_usage.get("local"), Some(&0));
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let stats = Arc::new(GatewayStats::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    stats.record_request();
                    stats.record_success("local");
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 800);
        assert_eq!(snapshot.successful_requests, 800);
        assert_eq!(snapshot.provider_usage.get("local"), Some(&800));
    }
}
