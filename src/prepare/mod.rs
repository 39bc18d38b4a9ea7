//! # Message Preparer
//!
//! Shapes a conversation for transmission: [`sanitize_messages`] rebuilds
//! each message with only wire-safe fields, and [`trim_to_budget`] evicts
//! old optional turns until the estimated token count fits a backend's
//! context budget, without ever breaking a tool-call/tool-response pair.
//!
//! Runs once per gateway request, before any provider is attempted.

mod sanitize;
mod trim;

pub use sanitize::sanitize_messages;
pub use trim::{estimate_tokens, trim_to_budget};
