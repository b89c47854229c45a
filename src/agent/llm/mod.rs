//! LLM client abstraction layer.
//!
//! This module provides:
//! - [`LlmClient`] trait: the single capability a session needs from a model
//! - [`Connector`] trait: builds a client from a validated configuration
//! - Gemini REST implementation of both

mod types;

use async_trait::async_trait;

use super::config::ValidatedConfig;
use crate::Result;

pub use types::*;

pub mod gemini;

pub use gemini::{GeminiClient, GeminiConnector};

/// LLM client trait: one `generateContent` style round trip.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the conversation and return the raw response.
    async fn generate(&self, contents: &[Content]) -> Result<GenerateContentResponse>;

    /// Release resources held by the client.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;
}

/// Establishes a client connection from validated settings.
pub trait Connector {
    type Client: LlmClient;

    fn connect(&self, config: &ValidatedConfig) -> Result<Self::Client>;
}

#[cfg(test)]
pub use fake::{FakeConnector, FakeLlmClient, FakeReply, FakeState};
