//! LLM-backed intent parsing
//!
//! Story text -> StoryContext (prompt) -> LlmClient -> decode_update -> PlanUpdate

pub mod client;
pub mod context;
pub mod parser;

pub use client::LlmClient;
pub use parser::{decode_update, IntentParser, LlmIntentParser};
