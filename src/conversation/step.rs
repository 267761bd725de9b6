//! Step tokens — backend-driven stages of the onboarding dialogue.

use serde::{Deserialize, Serialize};

/// An opaque token naming the current stage of the onboarding conversation.
///
/// The client never advances a step on its own: the token is overwritten
/// with whatever `next_step` value the backend returns, so an unknown token
/// is valid and simply carries a generic label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepToken(String);

/// The step every new conversation starts on.
pub const INITIAL_STEP: &str = "product";

/// The token the backend uses to signal the flow has finished.
pub const COMPLETE_STEP: &str = "complete";

impl StepToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this token marks the end of the onboarding flow.
    pub fn is_complete(&self) -> bool {
        self.0 == COMPLETE_STEP
    }

    /// Human-readable label for the step indicator.
    pub fn label(&self) -> &'static str {
        match self.0.as_str() {
            "product" => "your product",
            "market" => "your target market",
            "differentiation" => "what makes your product unique",
            "company_size" => "your target company size",
            "linkedin" => "LinkedIn integration",
            "location" => "your location",
            "complete" => "completing your setup",
            _ => "the next step",
        }
    }
}

impl Default for StepToken {
    fn default() -> Self {
        Self(INITIAL_STEP.to_string())
    }
}

impl std::fmt::Display for StepToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
