//! # Types Module
//!
//! Core data types for the gateway: chat messages, tool definitions, the
//! caller-facing request and the provider wire payload, and response
//! parsing. All wire-facing types serialize to the OpenAI-compatible JSON
//! shape; optional fields are omitted rather than sent as `null`.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ChatMessage`] | One conversation turn with role and optional content |
//! | [`Role`] | Message role (system, user, assistant, tool) |
//! | [`CompletionRequest`] | Caller-facing request built with `with_*` chains |
//! | [`ChatPayload`] | Provider-facing JSON body, model already translated |
//! | [`CompletionResponse`] | Parsed response with choices and usage |
//! | [`ToolSpec`] / [`ToolCall`] | Tool schema offered to and calls emitted by the model |

pub mod message;
pub mod request;
pub mod response;
pub mod tool;

pub use message::{ChatMessage, Role};
pub use request::{ChatPayload, CompletionRequest, StopSequences};
pub use response::{Choice, CompletionResponse, ResponseMessage, Usage};
pub use tool::{FunctionCall, FunctionSpec, ToolCall, ToolChoice, ToolSpec};
