//! ConversationSession — the single owner of all conversation state.
//!
//! The session synchronizes user input, backend responses, step transitions,
//! and keyword accumulation into one coherent view. Every handler receives
//! the session explicitly; there is no ambient global state. Rendering and
//! playback stay outside, behind [`SessionEvents`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::types::{AssistantReply, TurnRequest};
use crate::api::BackendApi;
use crate::capture::AudioClip;
use crate::config::ClientConfig;
use crate::conversation::keywords::KeywordSet;
use crate::conversation::step::StepToken;
use crate::conversation::transcript::{ChatMessage, Transcript};

/// Apology appended when a typed turn fails, for any reason.
pub const TURN_FAILURE_APOLOGY: &str = "I'm sorry, there was an error. Please try again.";

/// Apology appended when the backend could not make sense of uploaded audio.
pub const AUDIO_UNCLEAR_APOLOGY: &str =
    "I'm sorry, I couldn't understand what you said. Please try again.";

/// Apology appended when the audio upload itself fails.
pub const AUDIO_FAILURE_APOLOGY: &str =
    "I'm sorry, there was an error processing your voice input. Please try typing instead.";

/// Rendering/UX collaborator notified of conversation changes.
///
/// All methods default to no-ops so a front-end only implements what it
/// renders. Implementations are called while session state is being
/// updated: return quickly and never call back into the session.
pub trait SessionEvents: Send + Sync {
    /// A message was appended to the transcript (including placeholders).
    fn message_appended(&self, _message: &ChatMessage) {}
    /// The transient processing placeholder was removed.
    fn placeholder_cleared(&self) {}
    /// The backend advanced the conversation to a new step.
    fn step_changed(&self, _step: &StepToken) {}
    /// The keyword set changed; `keywords` is the full projection.
    fn keywords_updated(&self, _keywords: &[String]) {}
    /// The assistant reply carried spoken audio (base64 mp3).
    fn audio_received(&self, _mp3_base64: &str) {}
    /// One-time offer: recommendations are ready to view.
    fn recommendations_ready(&self) {}
    /// A voice-capture attempt started or ended.
    fn listening_changed(&self, _active: bool) {}
    /// Live preview of the transcript while capturing.
    fn transcript_preview(&self, _text: &str) {}
    /// Informational signal (degraded paths, capture failures).
    fn notice(&self, _message: &str) {}
}

/// Result of submitting one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Input was empty after trimming; nothing was sent or recorded.
    Ignored,
    /// Another request is already outstanding; this turn was dropped.
    Busy,
    /// The backend replied and the conversation continues.
    Replied,
    /// The backend signaled completion; recommendations are ready.
    Completed,
    /// The turn failed and an apology was appended in place of a reply.
    Failed,
}

struct SessionState {
    step: StepToken,
    keywords: KeywordSet,
    transcript: Transcript,
    recommendations_offered: bool,
}

/// One onboarding conversation against the backend.
pub struct ConversationSession {
    api: Arc<dyn BackendApi>,
    events: Arc<dyn SessionEvents>,
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
}

impl ConversationSession {
    pub fn new(
        api: Arc<dyn BackendApi>,
        events: Arc<dyn SessionEvents>,
        config: &ClientConfig,
    ) -> Self {
        let mut keywords = KeywordSet::new();
        keywords.merge(config.seed_keywords.iter().cloned());
        Self {
            api,
            events,
            state: Mutex::new(SessionState {
                step: StepToken::new(config.initial_step.clone()),
                keywords,
                transcript: Transcript::new(),
                recommendations_offered: false,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Submit one typed (or transcribed) turn.
    ///
    /// Empty input is a no-op. While a request is outstanding, further
    /// submissions are dropped rather than issuing duplicate turns. Note
    /// that resubmitting the same text later is a new turn: the backend
    /// treats every call as one.
    pub async fn submit_turn(&self, text: &str) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            return TurnOutcome::Ignored;
        }
        let Some(_guard) = self.try_begin_request() else {
            tracing::warn!("Dropping turn: another request is in flight");
            return TurnOutcome::Busy;
        };

        // Optimistic UI: user message and processing placeholder go into
        // the transcript before any network activity.
        let step = {
            let mut state = self.state.lock().await;
            self.append(&mut state, ChatMessage::user(text));
            self.append(&mut state, ChatMessage::placeholder());
            state.step.clone()
        };

        let request = TurnRequest {
            text: text.to_string(),
            step: step.as_str().to_string(),
        };
        match self.api.advance_turn(&request).await {
            Ok(response) if response.success => {
                let mut state = self.state.lock().await;
                self.clear_placeholder(&mut state);
                self.apply_reply(&mut state, response.reply);
                if response.recommendations_ready() {
                    self.offer_recommendations(&mut state);
                    TurnOutcome::Completed
                } else {
                    TurnOutcome::Replied
                }
            }
            Ok(response) => {
                tracing::warn!(error = ?response.error, step = %step, "Backend rejected turn");
                self.fail_turn(TURN_FAILURE_APOLOGY).await;
                TurnOutcome::Failed
            }
            Err(e) => {
                tracing::warn!(step = %step, "Turn request failed: {e}");
                self.fail_turn(TURN_FAILURE_APOLOGY).await;
                TurnOutcome::Failed
            }
        }
    }

    /// Submit one recorded-audio turn via the upload endpoint.
    ///
    /// The backend transcribes the clip and answers in one round trip; the
    /// returned transcript becomes the user message. No placeholder is
    /// shown on this path.
    pub async fn submit_audio_turn(&self, clip: AudioClip) -> TurnOutcome {
        let Some(_guard) = self.try_begin_request() else {
            tracing::warn!("Dropping audio turn: another request is in flight");
            return TurnOutcome::Busy;
        };

        let step = self.state.lock().await.step.clone();
        match self.api.transcribe_audio(&clip, &step).await {
            Ok(response) if response.success => {
                let mut state = self.state.lock().await;
                if !response.transcript.trim().is_empty() {
                    self.append(&mut state, ChatMessage::user(response.transcript.trim()));
                }
                if let Some(reply) = response.response {
                    self.apply_reply(&mut state, reply);
                }
                TurnOutcome::Replied
            }
            Ok(response) => {
                tracing::warn!(error = ?response.error, "Backend could not process audio");
                self.append_assistant(AUDIO_UNCLEAR_APOLOGY).await;
                TurnOutcome::Failed
            }
            Err(e) => {
                tracing::warn!("Audio turn request failed: {e}");
                self.append_assistant(AUDIO_FAILURE_APOLOGY).await;
                TurnOutcome::Failed
            }
        }
    }

    /// Fetch the assistant's opening question for the current step.
    ///
    /// Failure degrades to a notice; a session without a greeting is still
    /// usable.
    pub async fn fetch_opening_question(&self) {
        let step = self.state.lock().await.step.clone();
        match self.api.opening_question(&step).await {
            Ok(opening) if opening.success && !opening.question.trim().is_empty() => {
                let mut state = self.state.lock().await;
                self.append(&mut state, ChatMessage::assistant(opening.question.trim()));
                if let Some(payload) = opening.keywords {
                    self.merge_keywords(&mut state, payload.into_keywords());
                }
                if let Some(audio) = opening.audio {
                    self.events.audio_received(&audio);
                }
            }
            Ok(_) => {
                tracing::warn!(step = %step, "Opening question unavailable");
            }
            Err(e) => {
                tracing::warn!(step = %step, "Opening question fetch failed: {e}");
                self.events.notice("Could not reach the assistant. Check the backend and try again.");
            }
        }
    }

    /// Re-fetch extracted keywords and merge them in.
    ///
    /// Any failure degrades to "no keywords extracted".
    pub async fn refresh_keywords(&self) {
        match self.api.extracted_keywords().await {
            Ok(response) if response.success => {
                if let Some(payload) = response.keywords {
                    let mut state = self.state.lock().await;
                    self.merge_keywords(&mut state, payload.into_keywords());
                } else {
                    tracing::warn!("Keyword refresh returned no keywords");
                }
            }
            Ok(response) => {
                tracing::warn!(error = ?response.error, "Keyword refresh rejected");
            }
            Err(e) => {
                tracing::warn!("Keyword refresh failed: {e}");
            }
        }
    }

    /// Current step token.
    pub async fn step(&self) -> StepToken {
        self.state.lock().await.step.clone()
    }

    /// Snapshot of the accumulated keywords, first-seen order.
    pub async fn keywords(&self) -> Vec<String> {
        self.state.lock().await.keywords.entries().to_vec()
    }

    /// Snapshot of the transcript.
    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.state.lock().await.transcript.messages().to_vec()
    }

    // ── Internals ───────────────────────────────────────────────────

    fn try_begin_request(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .ok()?;
        Some(InFlightGuard {
            flag: &self.in_flight,
        })
    }

    fn append(&self, state: &mut SessionState, message: ChatMessage) {
        self.events.message_appended(&message);
        state.transcript.push(message);
    }

    fn clear_placeholder(&self, state: &mut SessionState) {
        if state.transcript.clear_placeholder() {
            self.events.placeholder_cleared();
        }
    }

    /// Apply the assistant's reply fields: text, step, keywords, audio.
    fn apply_reply(&self, state: &mut SessionState, reply: AssistantReply) {
        if !reply.text.is_empty() {
            self.append(state, ChatMessage::assistant(&reply.text));
        }
        if let Some(next_step) = reply.next_step {
            state.step = StepToken::new(next_step);
            self.events.step_changed(&state.step);
        }
        if let Some(payload) = reply.keywords {
            self.merge_keywords(state, payload.into_keywords());
        }
        if let Some(audio) = reply.audio {
            self.events.audio_received(&audio);
        }
    }

    fn merge_keywords(&self, state: &mut SessionState, batch: Vec<String>) {
        if batch.is_empty() {
            tracing::debug!("No keywords extracted from response");
            return;
        }
        state.keywords.merge(batch);
        // The projection is replaced wholesale on every non-empty batch.
        self.events.keywords_updated(state.keywords.entries());
    }

    fn offer_recommendations(&self, state: &mut SessionState) {
        if !state.recommendations_offered {
            state.recommendations_offered = true;
            self.events.recommendations_ready();
        }
    }

    async fn fail_turn(&self, apology: &str) {
        let mut state = self.state.lock().await;
        self.clear_placeholder(&mut state);
        self.append(&mut state, ChatMessage::assistant(apology));
    }

    async fn append_assistant(&self, text: &str) {
        let mut state = self.state.lock().await;
        self.append(&mut state, ChatMessage::assistant(text));
    }
}

/// Releases the single-outstanding-request slot on drop, so every exit
/// path — success, failure, panic — re-arms the session.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use crate::api::types::{
        AudioTurnResponse, KeywordsResponse, OpeningQuestion, TurnResponse,
    };
    use crate::conversation::transcript::Role;
    use crate::error::ApiError;
    use crate::recommendations::CompanyRecord;

    /// Scripted backend: pops queued turn responses, counts calls.
    #[derive(Default)]
    struct ScriptedApi {
        turns: StdMutex<Vec<Result<TurnResponse, ApiError>>>,
        audio_turns: StdMutex<Vec<Result<AudioTurnResponse, ApiError>>>,
        turn_calls: AtomicUsize,
        audio_calls: AtomicUsize,
        delay: Option<std::time::Duration>,
    }

    impl ScriptedApi {
        fn queue_turn(&self, response: Result<TurnResponse, ApiError>) {
            self.turns.lock().unwrap().insert(0, response);
        }
        fn queue_audio(&self, response: Result<AudioTurnResponse, ApiError>) {
            self.audio_turns.lock().unwrap().insert(0, response);
        }
    }

    #[async_trait]
    impl BackendApi for ScriptedApi {
        async fn advance_turn(&self, _request: &TurnRequest) -> Result<TurnResponse, ApiError> {
            self.turn_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.turns
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(TurnResponse::default()))
        }

        async fn transcribe_audio(
            &self,
            _clip: &AudioClip,
            _step: &StepToken,
        ) -> Result<AudioTurnResponse, ApiError> {
            self.audio_calls.fetch_add(1, Ordering::SeqCst);
            self.audio_turns
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(AudioTurnResponse::default()))
        }

        async fn opening_question(
            &self,
            _step: &StepToken,
        ) -> Result<OpeningQuestion, ApiError> {
            Ok(OpeningQuestion::default())
        }

        async fn recommendations(
            &self,
            _regenerate: bool,
        ) -> Result<Vec<CompanyRecord>, ApiError> {
            Ok(Vec::new())
        }

        async fn extracted_keywords(&self) -> Result<KeywordsResponse, ApiError> {
            Ok(KeywordsResponse::default())
        }
    }

    /// Records every event call for assertions.
    #[derive(Default)]
    struct EventLog {
        calls: StdMutex<Vec<String>>,
    }

    impl EventLog {
        fn names(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
        fn count(&self, name: &str) -> usize {
            self.names().iter().filter(|c| c.starts_with(name)).count()
        }
    }

    impl SessionEvents for EventLog {
        fn message_appended(&self, message: &ChatMessage) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("message:{}", message.text));
        }
        fn placeholder_cleared(&self) {
            self.calls.lock().unwrap().push("placeholder_cleared".into());
        }
        fn step_changed(&self, step: &StepToken) {
            self.calls.lock().unwrap().push(format!("step:{step}"));
        }
        fn keywords_updated(&self, keywords: &[String]) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("keywords:{}", keywords.join(",")));
        }
        fn audio_received(&self, _mp3_base64: &str) {
            self.calls.lock().unwrap().push("audio".into());
        }
        fn recommendations_ready(&self) {
            self.calls.lock().unwrap().push("recommendations_ready".into());
        }
    }

    fn turn_response(json: &str) -> TurnResponse {
        serde_json::from_str(json).unwrap()
    }

    fn session_with(api: Arc<ScriptedApi>, events: Arc<EventLog>) -> ConversationSession {
        ConversationSession::new(api, events, &ClientConfig::default())
    }

    #[tokio::test]
    async fn empty_input_is_ignored_without_side_effects() {
        let api = Arc::new(ScriptedApi::default());
        let events = Arc::new(EventLog::default());
        let session = session_with(Arc::clone(&api), Arc::clone(&events));

        assert_eq!(session.submit_turn("   ").await, TurnOutcome::Ignored);
        assert_eq!(session.submit_turn("").await, TurnOutcome::Ignored);

        assert_eq!(api.turn_calls.load(Ordering::SeqCst), 0);
        assert!(session.transcript().await.is_empty());
        assert!(events.names().is_empty());
    }

    #[tokio::test]
    async fn successful_turn_advances_step_and_merges_keywords() {
        let api = Arc::new(ScriptedApi::default());
        api.queue_turn(Ok(turn_response(
            r#"{
                "success": true,
                "text": "Great, tell me about your target market",
                "next_step": "market",
                "keywords": ["B2B Sales", "SaaS"]
            }"#,
        )));
        let events = Arc::new(EventLog::default());
        let session = session_with(Arc::clone(&api), Arc::clone(&events));

        let outcome = session.submit_turn("We sell B2B SaaS").await;
        assert_eq!(outcome, TurnOutcome::Replied);

        assert_eq!(session.step().await.as_str(), "market");
        // Seed keywords stay first; "B2B Sales" deduplicates against them.
        assert_eq!(
            session.keywords().await,
            ["B2B Sales", "AI Assistant", "Lead Generation", "SaaS"]
        );

        let transcript = session.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[0].text, "We sell B2B SaaS");
        assert_eq!(transcript[1].text, "Great, tell me about your target market");
        assert!(transcript.iter().all(|m| !m.transient));
        assert_eq!(events.count("placeholder_cleared"), 1);
        assert_eq!(events.count("step:market"), 1);
    }

    #[tokio::test]
    async fn backend_failure_flag_appends_apology() {
        let api = Arc::new(ScriptedApi::default());
        api.queue_turn(Ok(turn_response(
            r#"{"success": false, "error": "flow error"}"#,
        )));
        let session = session_with(Arc::clone(&api), Arc::new(EventLog::default()));

        assert_eq!(session.submit_turn("hello").await, TurnOutcome::Failed);

        let transcript = session.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].text, TURN_FAILURE_APOLOGY);
        assert!(transcript.iter().all(|m| !m.transient));
        // Step did not move.
        assert_eq!(session.step().await.as_str(), "product");
    }

    #[tokio::test]
    async fn transport_failure_appends_apology_and_clears_placeholder() {
        let api = Arc::new(ScriptedApi::default());
        api.queue_turn(Err(ApiError::Transport("connection refused".into())));
        let events = Arc::new(EventLog::default());
        let session = session_with(Arc::clone(&api), Arc::clone(&events));

        assert_eq!(session.submit_turn("hello").await, TurnOutcome::Failed);
        assert_eq!(events.count("placeholder_cleared"), 1);
        let transcript = session.transcript().await;
        assert_eq!(transcript[1].text, TURN_FAILURE_APOLOGY);
    }

    #[tokio::test]
    async fn completion_offers_recommendations_exactly_once() {
        let api = Arc::new(ScriptedApi::default());
        api.queue_turn(Ok(turn_response(
            r#"{"success": true, "text": "All set!", "completed": true}"#,
        )));
        api.queue_turn(Ok(turn_response(
            r#"{"success": true, "text": "Still set!", "show_recommendations_tab": true}"#,
        )));
        let events = Arc::new(EventLog::default());
        let session = session_with(Arc::clone(&api), Arc::clone(&events));

        assert_eq!(session.submit_turn("first").await, TurnOutcome::Completed);
        assert_eq!(session.submit_turn("second").await, TurnOutcome::Completed);
        assert_eq!(events.count("recommendations_ready"), 1);
    }

    #[tokio::test]
    async fn second_submission_while_in_flight_is_dropped() {
        let api = Arc::new(ScriptedApi {
            delay: Some(std::time::Duration::from_millis(100)),
            ..Default::default()
        });
        api.queue_turn(Ok(turn_response(r#"{"success": true, "text": "ok"}"#)));
        let session = Arc::new(session_with(Arc::clone(&api), Arc::new(EventLog::default())));

        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.submit_turn("one").await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(session.submit_turn("two").await, TurnOutcome::Busy);

        assert_eq!(first.await.unwrap(), TurnOutcome::Replied);
        assert_eq!(api.turn_calls.load(Ordering::SeqCst), 1);
        // The dropped turn left no trace in the transcript.
        let texts: Vec<String> = session
            .transcript()
            .await
            .iter()
            .map(|m| m.text.clone())
            .collect();
        assert_eq!(texts, ["one", "ok"]);
    }

    #[tokio::test]
    async fn audio_turn_appends_transcript_and_nested_reply() {
        let api = Arc::new(ScriptedApi::default());
        api.queue_audio(Ok(serde_json::from_str(
            r#"{
                "success": true,
                "transcript": "we target fintech startups",
                "response": {
                    "text": "What sets you apart?",
                    "next_step": "differentiation",
                    "keywords": ["Fintech"],
                    "audio": "bXAz"
                }
            }"#,
        )
        .unwrap()));
        let events = Arc::new(EventLog::default());
        let session = session_with(Arc::clone(&api), Arc::clone(&events));

        let clip = AudioClip::from_chunks(vec![vec![0u8; 4]], "audio/webm;codecs=opus");
        assert_eq!(session.submit_audio_turn(clip).await, TurnOutcome::Replied);

        let transcript = session.transcript().await;
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[0].text, "we target fintech startups");
        assert_eq!(transcript[1].text, "What sets you apart?");
        assert_eq!(session.step().await.as_str(), "differentiation");
        assert!(session.keywords().await.contains(&"Fintech".to_string()));
        assert_eq!(events.count("audio"), 1);
        // Audio path shows no placeholder.
        assert_eq!(events.count("placeholder_cleared"), 0);
    }

    #[tokio::test]
    async fn audio_turn_failure_uses_distinct_apologies() {
        let api = Arc::new(ScriptedApi::default());
        api.queue_audio(Ok(serde_json::from_str(
            r#"{"success": false, "error": "unintelligible"}"#,
        )
        .unwrap()));
        api.queue_audio(Err(ApiError::Status { status: 500 }));
        let session = session_with(Arc::clone(&api), Arc::new(EventLog::default()));

        let clip = AudioClip::from_chunks(vec![vec![1]], "audio/webm;codecs=opus");
        assert_eq!(
            session.submit_audio_turn(clip.clone()).await,
            TurnOutcome::Failed
        );
        assert_eq!(session.submit_audio_turn(clip).await, TurnOutcome::Failed);

        let texts: Vec<String> = session
            .transcript()
            .await
            .iter()
            .map(|m| m.text.clone())
            .collect();
        assert_eq!(texts, [AUDIO_UNCLEAR_APOLOGY, AUDIO_FAILURE_APOLOGY]);
    }

    #[tokio::test]
    async fn seed_keywords_are_present_from_the_start() {
        let session = session_with(
            Arc::new(ScriptedApi::default()),
            Arc::new(EventLog::default()),
        );
        assert_eq!(
            session.keywords().await,
            ["B2B Sales", "AI Assistant", "Lead Generation"]
        );
    }
}
