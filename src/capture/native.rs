//! Native transcription strategy — drives a speech recognizer to a final
//! transcript.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;

use crate::capture::recognizer::{RecognizerEvent, SpeechRecognizer};
use crate::capture::strategy::{CaptureStrategy, Captured};
use crate::conversation::SessionEvents;
use crate::error::CaptureError;

/// Captures speech via a native recognition engine.
///
/// Interim fragments are forwarded to the UI as previews while the session
/// runs; the attempt resolves with whatever text was captured when the
/// engine ends.
pub struct NativeTranscription {
    recognizer: Arc<dyn SpeechRecognizer>,
    events: Arc<dyn SessionEvents>,
}

impl NativeTranscription {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, events: Arc<dyn SessionEvents>) -> Self {
        Self { recognizer, events }
    }
}

#[async_trait]
impl CaptureStrategy for NativeTranscription {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn capture(&self) -> Result<Captured, CaptureError> {
        let mut stream = self.recognizer.start().await?;

        let mut final_text = String::new();
        let mut interim_text = String::new();

        while let Some(event) = stream.next().await {
            match event {
                RecognizerEvent::Interim(fragment) => {
                    interim_text = fragment;
                    let preview = if final_text.is_empty() {
                        &interim_text
                    } else {
                        &final_text
                    };
                    self.events.transcript_preview(preview);
                }
                RecognizerEvent::Final(fragment) => {
                    final_text.push_str(&fragment);
                    self.events.transcript_preview(&final_text);
                }
                RecognizerEvent::Error(reason) => {
                    return Err(CaptureError::Recognition(reason));
                }
                RecognizerEvent::End => break,
            }
        }

        // The engine may end before any final result lands; fall back to
        // the last interim fragment, like the captured input field would.
        let text = if final_text.is_empty() {
            interim_text
        } else {
            final_text
        };
        Ok(Captured::Transcript(text))
    }

    async fn stop(&self) {
        self.recognizer.stop().await;
    }
}
