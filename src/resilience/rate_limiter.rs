use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

/// Point-in-time view of one operation's window.
#[derive(Debug, Clone)]
pub struct RateWindowSnapshot {
    pub budget: u32,
    /// Admissions currently inside the window.
    pub used: u32,
    pub remaining: u32,
}

/// Sliding-window request limiter keyed by operation name.
///
/// - Counts admissions inside a rolling window (60 seconds by default)
/// - A denied attempt is not recorded and never consumes budget
/// - Windows are created lazily the first time an operation is seen
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    default_budget: u32,
    budgets: RwLock<HashMap<String, u32>>,
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Limiter with a 60 second rolling window.
    pub fn new(default_budget: u32) -> Self {
        Self::with_window(default_budget, Duration::from_secs(60))
    }

    pub fn with_window(default_budget: u32, window: Duration) -> Self {
        Self {
            window,
            default_budget,
            budgets: RwLock::new(HashMap::new()),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Override the budget for one operation; others keep the default.
    pub fn set_budget(&self, operation: &str, budget: u32) {
        let mut budgets = self.budgets.write().unwrap_or_else(|p| p.into_inner());
        budgets.insert(operation.to_string(), budget);
    }

    pub fn budget(&self, operation: &str) -> u32 {
        let budgets = self.budgets.read().unwrap_or_else(|p| p.into_inner());
        budgets.get(operation).copied().unwrap_or(self.default_budget)
    }

    /// Try to admit one request for `operation` without waiting.
    ///
    /// Returns `false` when the window is already at budget; the attempt
    /// itself is not counted, so callers can re-try later without having
    /// pushed the reset further out.
    pub fn admit(&self, operation: &str) -> bool {
        let budget = self.budget(operation);
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|p| p.into_inner());
        let hits = windows.entry(operation.to_string()).or_default();
        Self::prune(hits, now, self.window);
        if hits.len() as u32 >= budget {
            return false;
        }
        hits.push_back(now);
        true
    }

    /// Budget still available for `operation` right now.
    pub fn remaining(&self, operation: &str) -> u32 {
        self.snapshot(operation).remaining
    }

    pub fn snapshot(&self, operation: &str) -> RateWindowSnapshot {
        let budget = self.budget(operation);
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|p| p.into_inner());
        let hits = windows.entry(operation.to_string()).or_default();
        Self::prune(hits, now, self.window);
        let used = hits.len() as u32;
        RateWindowSnapshot {
            budget,
            used,
            remaining: budget.saturating_sub(used),
        }
    }

    fn prune(hits: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        let Some(cutoff) = now.checked_sub(window) else {
            return;
        };
        // Timestamps are appended in order, so expired entries sit at the front.
        while hits.front().is_some_and(|t| *t <= cutoff) {
            hits.pop_front();
        }
    }
}
