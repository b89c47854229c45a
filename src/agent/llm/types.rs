//! Gemini `generateContent` wire types.

use serde::{Deserialize, Serialize};

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// A chat turn: a role and its parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ChatRole>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A turn holding a single text part.
    pub fn text(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part::text(text)],
        }
    }

    /// Text of the first part, if it has any.
    pub fn first_text(&self) -> Option<&str> {
        self.parts.first().and_then(|p| p.text.as_deref())
    }
}

/// A single part of a turn. Only text parts are produced or consumed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: &'a [Content],
}

/// Top-level Gemini API response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Response with one candidate per text, each holding a single part.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: texts
                .into_iter()
                .map(|t| Candidate {
                    content: Content::text(ChatRole::Model, t),
                    finish_reason: Some("STOP".to_string()),
                })
                .collect(),
            usage_metadata: None,
        }
    }
}

/// A single response candidate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
    pub finish_reason: Option<String>,
}

/// Token usage metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<usize>,
    pub candidates_token_count: Option<usize>,
    pub total_token_count: Option<usize>,
}
