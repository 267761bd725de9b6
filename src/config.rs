//! Configuration types.

use std::time::Duration;

use crate::capture::AudioFormat;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend API.
    pub base_url: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Step token the conversation starts on.
    pub initial_step: String,
    /// Keywords shown before the backend has extracted anything.
    pub seed_keywords: Vec<String>,
    /// Capture format for the audio-upload fallback.
    pub audio: AudioFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout: Duration::from_secs(30),
            initial_step: "product".to_string(),
            seed_keywords: vec![
                "B2B Sales".to_string(),
                "AI Assistant".to_string(),
                "Lead Generation".to_string(),
            ],
            audio: AudioFormat::default(),
        }
    }
}
