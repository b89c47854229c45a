//! Agent configuration: the `genai` section and its validation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use tracing::warn;

use crate::config::ConfigDocument;
use crate::error::Error;
use crate::Result;

/// Conventional key of the agent section in the config document.
pub const GENAI_SECTION: &str = "genai";

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini models this tool knows about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum GeminiModel {
    #[default]
    #[strum(serialize = "gemini-2.0-flash")]
    Gemini20Flash,
    #[strum(serialize = "gemini-2.0-pro")]
    Gemini20Pro,
}

impl GeminiModel {
    /// Map any identifier onto a known model.
    ///
    /// Unknown or empty identifiers fall back to the default model instead of
    /// failing.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        match Self::from_str(trimmed) {
            Ok(model) => model,
            Err(_) => {
                if !trimmed.is_empty() {
                    warn!("Unknown model '{}', using {}", trimmed, Self::default());
                }
                Self::default()
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Gemini connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiSettings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub model: String,

    /// Override for the REST endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Raw agent configuration as found in the `genai` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub gemini: GeminiSettings,

    /// Persona stored alongside the credentials; the session role is given
    /// at creation time and takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Configuration that passed validation. Only built by [`AgentConfig::validate`].
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    api_key: String,
    model: GeminiModel,
    base_url: String,
}

impl ValidatedConfig {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model(&self) -> GeminiModel {
        self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for ValidatedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AgentConfig {
    /// Create a config from a key and a model identifier.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            gemini: GeminiSettings {
                api_key: api_key.into(),
                model: model.into(),
                base_url: None,
            },
            role: None,
        }
    }

    /// Decode the named section of a config document.
    ///
    /// A missing section means there is no credential to work with.
    pub fn extract(doc: &ConfigDocument, section: &str) -> Result<Self> {
        doc.section::<Self>(section)?.ok_or(Error::EmptyCredential)
    }

    /// Replace the model identifier, e.g. from a command-line flag.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.gemini.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.gemini.base_url = Some(base_url.into());
        self
    }

    /// Check the credential and resolve the model.
    pub fn validate(self) -> Result<ValidatedConfig> {
        if self == Self::default() || self.gemini.api_key.trim().is_empty() {
            return Err(Error::EmptyCredential);
        }

        let model = GeminiModel::normalize(&self.gemini.model);
        let base_url = self
            .gemini
            .base_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(ValidatedConfig {
            api_key: self.gemini.api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}
