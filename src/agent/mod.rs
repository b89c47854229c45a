//! Agent module: configuration, model client and session.
//!
//! This module contains:
//! - Agent configuration and validation (`genai` section)
//! - LLM client trait and the Gemini implementation
//! - The single-shot chat session

mod config;
mod session;

// LLM providers in submodule
pub mod llm;

// Re-exports for convenience
pub use config::{
    AgentConfig, GeminiModel, GeminiSettings, ValidatedConfig, DEFAULT_BASE_URL, GENAI_SECTION,
};
pub use llm::{Connector, GeminiClient, GeminiConnector, LlmClient};
pub use session::{frame_user_input, AgentSession, USER_FRAMING};
