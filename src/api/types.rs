//! Wire types for the backend API.
//!
//! Every response field decodes defensively: the backend has shipped several
//! shapes over time, and a missing field is a content gap, not an error.

use serde::{Deserialize, Serialize};

use crate::conversation::KeywordPayload;

/// Body of a turn-advancement request.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRequest {
    pub text: String,
    pub step: String,
}

/// The assistant's reply fields, shared between the typed-turn response
/// (flattened) and the audio response (nested under `response`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantReply {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub next_step: Option<String>,
    #[serde(default)]
    pub keywords: Option<KeywordPayload>,
    /// Base64-encoded mp3, forwarded verbatim to the playback collaborator.
    #[serde(default)]
    pub audio: Option<String>,
}

/// Response from the turn-advancement endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurnResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(flatten)]
    pub reply: AssistantReply,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub show_recommendations_tab: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl TurnResponse {
    /// Whether this response signals that recommendations are ready.
    pub fn recommendations_ready(&self) -> bool {
        self.completed || self.show_recommendations_tab
    }
}

/// Response from the audio-upload endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioTurnResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub response: Option<AssistantReply>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from the opening-question endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpeningQuestion {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub keywords: Option<KeywordPayload>,
}

/// Response from the extracted-keywords endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub keywords: Option<KeywordPayload>,
    #[serde(default)]
    pub error: Option<String>,
}
