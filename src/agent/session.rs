//! Agent session - one persona, one question, one short answer.
//!
//! A session is created from an unvalidated [`AgentConfig`]; validation and
//! the role check run before the connector is touched. Every call to
//! [`AgentSession::query`] starts a fresh chat made of the persona turn and
//! the framed user message, so queries on the same session never see each
//! other's history.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::{AgentConfig, GeminiModel};
use super::llm::{ChatRole, Connector, Content, GenerateContentResponse, LlmClient};
use crate::error::Error;
use crate::Result;

/// Prefix attributing the operator's input to the user.
pub const USER_FRAMING: &str = "from: user";

/// Frame raw operator input as the user's turn.
pub fn frame_user_input(events: &str) -> String {
    format!("{USER_FRAMING}: {events}")
}

/// A connected chat session seeded with a persona.
pub struct AgentSession<C: LlmClient> {
    client: Option<C>,
    model: GeminiModel,
    persona: Content,
}

impl<C: LlmClient> AgentSession<C> {
    /// Validate `config`, connect, and seed the persona turn from `role`.
    pub fn create<K>(config: AgentConfig, role: &str, connector: &K) -> Result<Self>
    where
        K: Connector<Client = C>,
    {
        if role.trim().is_empty() {
            return Err(Error::InvalidQuery("role cannot be empty".to_string()));
        }

        let validated = config.validate()?;
        let client = connector.connect(&validated)?;
        info!("Agent session connected (model: {})", client.model());

        Ok(Self {
            client: Some(client),
            model: validated.model(),
            persona: Content::text(ChatRole::Model, role),
        })
    }

    /// Send `events` and return the first text of the first candidate.
    ///
    /// Fails with [`Error::Cancelled`] if `cancel` fires before the model
    /// answers.
    pub async fn query(&mut self, cancel: &CancellationToken, events: &str) -> Result<String> {
        if events.trim().is_empty() {
            return Err(Error::InvalidQuery("events cannot be empty".to_string()));
        }
        let client = self.client.as_ref().ok_or(Error::SessionClosed)?;
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let contents = [
            self.persona.clone(),
            Content::text(ChatRole::User, frame_user_input(events)),
        ];
        debug!("Sending {} chars of events to {}", events.len(), self.model);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = client.generate(&contents) => result?,
        };

        let text = first_text(response)?;
        info!("Model answered with {} chars", text.len());
        Ok(text)
    }

    /// Query once, then close the session.
    ///
    /// The query outcome is returned even if releasing the connection fails;
    /// close failures are only logged.
    pub async fn query_once(mut self, cancel: &CancellationToken, events: &str) -> Result<String> {
        let answer = self.query(cancel, events).await;
        if let Err(e) = self.close() {
            warn!("Failed to close agent session: {}", e);
        }
        answer
    }

    /// Release the connection. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.client.take() {
            Some(mut client) => {
                debug!("Closing agent session");
                client.close()
            }
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_none()
    }

    pub fn model(&self) -> GeminiModel {
        self.model
    }

    /// The seeded persona turn.
    pub fn persona(&self) -> &Content {
        &self.persona
    }
}

fn first_text(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or(Error::EmptyResponse)
}
