//! Conversation client — turn-by-turn onboarding dialogue state.
//!
//! The conversation is a structured exchange between the user and the
//! assistant, progressing through backend-driven steps while accumulating
//! extracted keywords. [`ConversationSession`] is the single owner of all
//! mutable conversation state; rendering goes through [`SessionEvents`].

pub mod keywords;
pub mod session;
pub mod step;
pub mod transcript;

pub use keywords::{CappedGrowth, KeywordPayload, KeywordPolicy, KeywordSet, UnboundedGrowth};
pub use session::{ConversationSession, SessionEvents, TurnOutcome};
pub use step::StepToken;
pub use transcript::{ChatMessage, Role, Transcript};
