//! The capture capability interface and one-time strategy selection.

use std::sync::Arc;

use async_trait::async_trait;

use crate::capture::native::NativeTranscription;
use crate::capture::recognizer::SpeechRecognizer;
use crate::capture::recorder::{AudioClip, AudioFormat, AudioRecorder};
use crate::capture::upload::AudioUpload;
use crate::conversation::SessionEvents;
use crate::error::CaptureError;

/// What one capture attempt produced.
#[derive(Debug, Clone)]
pub enum Captured {
    /// Transcript text from the native recognizer. May be empty when the
    /// engine heard nothing; the caller decides whether to submit.
    Transcript(String),
    /// Buffered raw audio from the fallback recorder, to be uploaded for
    /// server-side transcription.
    Audio(AudioClip),
}

/// One capture path: native transcription or audio upload.
///
/// Both paths share this contract so the rest of the client never cares
/// which one is active.
#[async_trait]
pub trait CaptureStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run one capture attempt to completion.
    ///
    /// Resolves when the attempt ends — explicit [`stop`](Self::stop),
    /// engine end, or engine error. Errors are terminal for the attempt
    /// only.
    async fn capture(&self) -> Result<Captured, CaptureError>;

    /// Ask the running attempt to wrap up.
    async fn stop(&self);
}

/// Pick the capture path once at session start.
///
/// Native transcription wins when a recognizer exists; otherwise the
/// audio-upload fallback; otherwise voice capture is unavailable and the
/// caller disables the control for the rest of the session.
pub fn select_strategy(
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    recorder: Option<Arc<dyn AudioRecorder>>,
    events: Arc<dyn SessionEvents>,
    format: AudioFormat,
) -> Result<Arc<dyn CaptureStrategy>, CaptureError> {
    if let Some(recognizer) = recognizer {
        tracing::info!("Voice capture: native transcription");
        return Ok(Arc::new(NativeTranscription::new(recognizer, events)));
    }
    if let Some(recorder) = recorder {
        tracing::info!("Voice capture: audio-upload fallback");
        return Ok(Arc::new(AudioUpload::new(recorder, format)));
    }
    Err(CaptureError::Unavailable(
        "no speech recognizer or microphone recorder".to_string(),
    ))
}
