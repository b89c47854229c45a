//! Gemini LLM client implementation (API key authentication).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::agent::config::ValidatedConfig;
use crate::error::Error;
use crate::Result;

use super::{Connector, Content, GenerateContentRequest, GenerateContentResponse, LlmClient};

/// Gemini API client using API key authentication.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiClient {
    /// Create a client on top of an existing HTTP client.
    pub fn new(config: &ValidatedConfig, client: Client) -> Self {
        Self {
            api_key: config.api_key().to_string(),
            model: config.model().to_string(),
            base_url: config.base_url().to_string(),
            client,
        }
    }

    fn build_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, contents: &[Content]) -> Result<GenerateContentResponse> {
        let request = GenerateContentRequest { contents };
        debug!("POST {} ({} turns)", self.build_url(), contents.len());

        let response = self
            .client
            .post(self.build_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Remote(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Remote(format!(
                "Gemini API error ({status}): {error_text}"
            )));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| Error::Remote(format!("invalid response body: {}", e.without_url())))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Builds [`GeminiClient`]s.
#[derive(Debug, Clone, Default)]
pub struct GeminiConnector {
    connect_timeout: Option<Duration>,
}

impl GeminiConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the time spent establishing TCP/TLS connections.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

impl Connector for GeminiConnector {
    type Client = GeminiClient;

    fn connect(&self, config: &ValidatedConfig) -> Result<GeminiClient> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Connection(format!("Failed to create Gemini client: {e}")))?;

        Ok(GeminiClient::new(config, client))
    }
}
