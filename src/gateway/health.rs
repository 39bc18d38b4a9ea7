use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Most recent health observation for one provider.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unix millis of the observation.
    pub checked_at_ms: u64,
}

impl ProviderStatus {
    pub fn healthy(name: impl Into<String>, latency_ms: Option<u64>) -> Self {
        Self {
            name: name.into(),
            healthy: true,
            latency_ms,
            error: None,
            checked_at_ms: now_ms(),
        }
    }

    pub fn unhealthy(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            healthy: false,
            latency_ms: None,
            error: Some(error.into()),
            checked_at_ms: now_ms(),
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Last known status per provider, in configuration order.
///
/// Written by health probes and by the router on live call outcomes.
/// Diagnostics only; routing never reads it.
#[derive(Debug, Default)]
pub struct StatusBoard {
    entries: RwLock<Vec<ProviderStatus>>,
}

impl StatusBoard {
    /// Seed one entry per provider, assumed healthy until observed otherwise.
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let entries = names
            .into_iter()
            .map(|name| ProviderStatus::healthy(name, None))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn update(&self, status: ProviderStatus) {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        match entries.iter_mut().find(|e| e.name == status.name) {
            Some(slot) => *slot = status,
            None => entries.push(status),
        }
    }

    pub fn mark_healthy(&self, name: &str, latency_ms: Option<u64>) {
        self.update(ProviderStatus::healthy(name, latency_ms));
    }

    pub fn mark_unhealthy(&self, name: &str, error: impl Into<String>) {
        self.update(ProviderStatus::unhealthy(name, error));
    }

    pub fn get(&self, name: &str) -> Option<ProviderStatus> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        entries.iter().find(|e| e.name == name).cloned()
    }

    pub fn snapshot(&self) -> Vec<ProviderStatus> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_entries_start_healthy() {
        let board = StatusBoard::new(["one", "two"]);
        let snapshot = board.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|s| s.healthy));
        assert!(snapshot.iter().all(|s| s.error.is_none()));
    }

    #[test]
    fn test_snapshot_preserves_seed_order() {
        let board = StatusBoard::new(["first", "second", "third"]);
        board.mark_unhealthy("second", "request timeout");

        let names: Vec<_> = board.snapshot().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_transitions_overwrite_in_place() {
        let board = StatusBoard::new(["local"]);
        board.mark_unhealthy("local", "cannot connect to service");
        let status = board.get("local").unwrap();
        assert!(!status.healthy);
        assert_eq!(status.error.as_deref(), Some("cannot connect to service"));

        board.mark_healthy("local", Some(12));
        let status = board.get("local").unwrap();
        assert!(status.healthy);
        assert_eq!(status.latency_ms, Some(12));
        assert!(status.error.is_none());
        assert_eq!(board.snapshot().len(), 1);
    }

    #[test]
    fn test_unknown_name_is_appended() {
        let board = StatusBoard::new(["known"]);
        board.mark_unhealthy("late-addition", "HTTP 503");
        assert_eq!(board.snapshot().len(), 2);
        assert!(board.get("late-addition").is_some());
    }
}
