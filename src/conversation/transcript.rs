//! Chat transcript — append-only message history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Placeholder text shown while a turn request is outstanding.
pub const PROCESSING_PLACEHOLDER: &str = "Processing...";

/// A single message in the conversation view.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    /// Transient messages are removed once the corresponding request
    /// resolves — the only deletion case in the transcript.
    pub transient: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, text: impl Into<String>, transient: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            transient,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text, false)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text, false)
    }

    /// The optimistic "processing" indicator appended before any network
    /// activity on a turn.
    pub fn placeholder() -> Self {
        Self::new(Role::Assistant, PROCESSING_PLACEHOLDER, true)
    }
}

/// The ordered message history for one conversation.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Remove the outstanding transient placeholder, if any.
    ///
    /// Returns whether one was removed, so callers can fire the matching
    /// UI notification exactly once per turn.
    pub fn clear_placeholder(&mut self) -> bool {
        match self.messages.iter().position(|m| m.transient) {
            Some(index) => {
                self.messages.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
