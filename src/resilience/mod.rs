//! # Resilience Primitives Module
//!
//! Admission control and retry pacing for outbound provider traffic.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`rate_limiter`] | Sliding-window admission control per operation name |
//! | [`backoff`] | Exponential retry delays with jitter |
//!
//! ## Rate Limiter
//!
//! One [`rate_limiter::RateLimiter`] serves any number of independent
//! operations; each gets its own rolling window, created lazily:
//!
//! ```rust
//! use llm_gateway::resilience::rate_limiter::RateLimiter;
//!
//! let limiter = RateLimiter::new(60);
//! limiter.set_budget("local", 20);
//!
//! if limiter.admit("local") {
//!     // Proceed with the call...
//! }
//! ```
//!
//! Denial is immediate; callers decide whether to surface it or fall back.
//!
//! ## Backoff
//!
//! ```rust
//! use llm_gateway::resilience::backoff::BackoffPolicy;
//!
//! let policy = BackoffPolicy::default();
//! let delay = policy.delay_with_jitter(1); // 2s..3s for the second retry
//! # let _ = delay;
//! ```

pub mod backoff;
pub mod rate_limiter;

pub use backoff::BackoffPolicy;
pub use rate_limiter::{RateLimiter, RateWindowSnapshot};
