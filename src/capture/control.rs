//! Recording control — the Idle → Listening → (Idle | Submitting) machine.

use std::sync::{Arc, Mutex};

use crate::capture::strategy::{CaptureStrategy, Captured};
use crate::conversation::{ConversationSession, SessionEvents};

/// Lifecycle of one capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Listening,
    Submitting,
}

/// Drives capture attempts and bridges them into conversational turns.
///
/// At most one attempt runs at a time, enforced by state. Entering
/// `Listening` and leaving it are always made visible through
/// [`SessionEvents::listening_changed`]; a native attempt that ends with
/// captured text triggers exactly one turn submission, which is how voice
/// input becomes a turn without an explicit send action.
pub struct VoiceControl {
    session: Arc<ConversationSession>,
    strategy: Arc<dyn CaptureStrategy>,
    events: Arc<dyn SessionEvents>,
    state: Arc<Mutex<RecordingState>>,
}

impl VoiceControl {
    pub fn new(
        session: Arc<ConversationSession>,
        strategy: Arc<dyn CaptureStrategy>,
        events: Arc<dyn SessionEvents>,
    ) -> Self {
        Self {
            session,
            strategy,
            events,
            state: Arc::new(Mutex::new(RecordingState::Idle)),
        }
    }

    pub fn state(&self) -> RecordingState {
        *self.state.lock().unwrap()
    }

    /// One button, like the record control: starts an attempt when idle,
    /// requests a stop while listening, and ignores presses while a
    /// fallback submission is wrapping up.
    pub async fn toggle(&self) {
        match self.state() {
            RecordingState::Idle => {
                self.begin();
            }
            RecordingState::Listening => self.strategy.stop().await,
            RecordingState::Submitting => {}
        }
    }

    /// Start a capture attempt on a background task.
    fn begin(&self) -> Option<tokio::task::JoinHandle<()>> {
        {
            let mut state = self.state.lock().unwrap();
            if *state != RecordingState::Idle {
                return None;
            }
            *state = RecordingState::Listening;
        }
        self.events.listening_changed(true);
        Some(tokio::spawn(run_attempt(
            Arc::clone(&self.session),
            Arc::clone(&self.strategy),
            Arc::clone(&self.events),
            Arc::clone(&self.state),
        )))
    }
}

/// One capture attempt from `Listening` to completion.
async fn run_attempt(
    session: Arc<ConversationSession>,
    strategy: Arc<dyn CaptureStrategy>,
    events: Arc<dyn SessionEvents>,
    state: Arc<Mutex<RecordingState>>,
) {
    let result = strategy.capture().await;
    events.listening_changed(false);
    match result {
        Ok(Captured::Transcript(text)) => {
            *state.lock().unwrap() = RecordingState::Idle;
            let text = text.trim().to_string();
            if !text.is_empty() {
                session.submit_turn(&text).await;
            }
        }
        Ok(Captured::Audio(clip)) => {
            *state.lock().unwrap() = RecordingState::Submitting;
            session.submit_audio_turn(clip).await;
            *state.lock().unwrap() = RecordingState::Idle;
        }
        Err(e) => {
            // Terminal for this attempt only; the control stays usable.
            *state.lock().unwrap() = RecordingState::Idle;
            tracing::warn!(strategy = strategy.name(), "Capture attempt failed: {e}");
            events.notice(&format!("Voice capture failed: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use crate::api::types::{
        AudioTurnResponse, KeywordsResponse, OpeningQuestion, TurnRequest, TurnResponse,
    };
    use crate::api::BackendApi;
    use crate::capture::recorder::AudioClip;
    use crate::config::ClientConfig;
    use crate::conversation::StepToken;
    use crate::error::{ApiError, CaptureError};
    use crate::recommendations::CompanyRecord;

    /// Backend that only counts calls.
    #[derive(Default)]
    struct CountingApi {
        turn_calls: AtomicUsize,
        audio_calls: AtomicUsize,
        last_turn_text: StdMutex<Option<String>>,
    }

    #[async_trait]
    impl BackendApi for CountingApi {
        async fn advance_turn(&self, request: &TurnRequest) -> Result<TurnResponse, ApiError> {
            self.turn_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_turn_text.lock().unwrap() = Some(request.text.clone());
            Ok(serde_json::from_str(r#"{"success": true, "text": "ok"}"#).unwrap())
        }
        async fn transcribe_audio(
            &self,
            _clip: &AudioClip,
            _step: &StepToken,
        ) -> Result<AudioTurnResponse, ApiError> {
            self.audio_calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::from_str(r#"{"success": true, "transcript": "hi"}"#).unwrap())
        }
        async fn opening_question(&self, _step: &StepToken) -> Result<OpeningQuestion, ApiError> {
            Ok(OpeningQuestion::default())
        }
        async fn recommendations(&self, _regenerate: bool) -> Result<Vec<CompanyRecord>, ApiError> {
            Ok(Vec::new())
        }
        async fn extracted_keywords(&self) -> Result<KeywordsResponse, ApiError> {
            Ok(KeywordsResponse::default())
        }
    }

    #[derive(Default)]
    struct UiLog {
        listening: StdMutex<Vec<bool>>,
        notices: StdMutex<Vec<String>>,
    }

    impl SessionEvents for UiLog {
        fn listening_changed(&self, active: bool) {
            self.listening.lock().unwrap().push(active);
        }
        fn notice(&self, message: &str) {
            self.notices.lock().unwrap().push(message.to_string());
        }
    }

    /// Strategy with a fixed outcome.
    struct FixedStrategy(Result<Captured, CaptureError>);

    #[async_trait]
    impl CaptureStrategy for FixedStrategy {
        fn name(&self) -> &'static str {
            "fixed"
        }
        async fn capture(&self) -> Result<Captured, CaptureError> {
            match &self.0 {
                Ok(captured) => Ok(captured.clone()),
                Err(CaptureError::PermissionDenied) => Err(CaptureError::PermissionDenied),
                Err(CaptureError::Recognition(r)) => Err(CaptureError::Recognition(r.clone())),
                Err(CaptureError::Unavailable(r)) => Err(CaptureError::Unavailable(r.clone())),
            }
        }
        async fn stop(&self) {}
    }

    fn control_with(
        api: Arc<CountingApi>,
        ui: Arc<UiLog>,
        outcome: Result<Captured, CaptureError>,
    ) -> VoiceControl {
        let session = Arc::new(ConversationSession::new(
            api as Arc<dyn BackendApi>,
            Arc::clone(&ui) as Arc<dyn SessionEvents>,
            &ClientConfig::default(),
        ));
        VoiceControl::new(session, Arc::new(FixedStrategy(outcome)), ui)
    }

    #[tokio::test]
    async fn nonempty_transcript_submits_exactly_one_turn() {
        let api = Arc::new(CountingApi::default());
        let ui = Arc::new(UiLog::default());
        let control = control_with(
            Arc::clone(&api),
            Arc::clone(&ui),
            Ok(Captured::Transcript("We sell B2B SaaS".to_string())),
        );

        control.begin().unwrap().await.unwrap();

        assert_eq!(api.turn_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            api.last_turn_text.lock().unwrap().as_deref(),
            Some("We sell B2B SaaS")
        );
        assert_eq!(control.state(), RecordingState::Idle);
        assert_eq!(*ui.listening.lock().unwrap(), [true, false]);
    }

    #[tokio::test]
    async fn empty_transcript_submits_nothing() {
        let api = Arc::new(CountingApi::default());
        let ui = Arc::new(UiLog::default());
        let control = control_with(
            Arc::clone(&api),
            Arc::clone(&ui),
            Ok(Captured::Transcript("   ".to_string())),
        );

        control.begin().unwrap().await.unwrap();

        assert_eq!(api.turn_calls.load(Ordering::SeqCst), 0);
        assert_eq!(control.state(), RecordingState::Idle);
        // UI still saw the listening cycle.
        assert_eq!(*ui.listening.lock().unwrap(), [true, false]);
    }

    #[tokio::test]
    async fn audio_capture_goes_through_the_upload_turn() {
        let api = Arc::new(CountingApi::default());
        let ui = Arc::new(UiLog::default());
        let clip = AudioClip::from_chunks(vec![vec![9, 9]], "audio/webm;codecs=opus");
        let control = control_with(Arc::clone(&api), Arc::clone(&ui), Ok(Captured::Audio(clip)));

        control.begin().unwrap().await.unwrap();

        assert_eq!(api.audio_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.turn_calls.load(Ordering::SeqCst), 0);
        assert_eq!(control.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn capture_error_reverts_and_notifies() {
        let api = Arc::new(CountingApi::default());
        let ui = Arc::new(UiLog::default());
        let control = control_with(
            Arc::clone(&api),
            Arc::clone(&ui),
            Err(CaptureError::PermissionDenied),
        );

        control.begin().unwrap().await.unwrap();

        assert_eq!(api.turn_calls.load(Ordering::SeqCst), 0);
        assert_eq!(control.state(), RecordingState::Idle);
        assert_eq!(*ui.listening.lock().unwrap(), [true, false]);
        let notices = ui.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("permission denied"));
    }

    #[tokio::test]
    async fn begin_outside_idle_is_refused() {
        let api = Arc::new(CountingApi::default());
        let ui = Arc::new(UiLog::default());
        let control = control_with(
            Arc::clone(&api),
            Arc::clone(&ui),
            Ok(Captured::Transcript(String::new())),
        );

        *control.state.lock().unwrap() = RecordingState::Listening;
        assert!(control.begin().is_none());
        *control.state.lock().unwrap() = RecordingState::Submitting;
        assert!(control.begin().is_none());
    }
}
