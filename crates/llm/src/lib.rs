//! LLM client for the tripdesk chat assistant and travel idea copywriting

mod ai_types;
mod assistant;
mod client;
mod content;
mod error;

pub use ai_types::{ChatMessage, ChatRole};
pub use assistant::{MAX_HISTORY_MESSAGES, describe_booking};
pub use client::{DEFAULT_BASE_URL, DEFAULT_MODEL, LlmClient};
pub use error::LlmError;

#[cfg(test)]
mod retry_tests;
