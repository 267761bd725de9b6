//! Backend API — typed interface to the assistant's HTTP/JSON endpoints.

pub mod http;
pub mod types;

use async_trait::async_trait;

use crate::capture::AudioClip;
use crate::conversation::StepToken;
use crate::error::ApiError;
use crate::recommendations::CompanyRecord;

pub use http::HttpBackend;
pub use types::{
    AssistantReply, AudioTurnResponse, KeywordsResponse, OpeningQuestion, TurnRequest,
    TurnResponse,
};

/// The backend endpoints the client talks to.
///
/// A seam for tests and alternate transports; [`HttpBackend`] is the
/// production implementation.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Submit one conversational turn: the user's text plus the current step.
    async fn advance_turn(&self, request: &TurnRequest) -> Result<TurnResponse, ApiError>;

    /// Submit recorded audio for server-side transcription and turn handling.
    async fn transcribe_audio(
        &self,
        clip: &AudioClip,
        step: &StepToken,
    ) -> Result<AudioTurnResponse, ApiError>;

    /// Fetch the assistant's opening question for a step.
    async fn opening_question(&self, step: &StepToken) -> Result<OpeningQuestion, ApiError>;

    /// Fetch the finished recommendation list.
    async fn recommendations(&self, regenerate: bool) -> Result<Vec<CompanyRecord>, ApiError>;

    /// Fetch the currently extracted keywords.
    async fn extracted_keywords(&self) -> Result<KeywordsResponse, ApiError>;
}
