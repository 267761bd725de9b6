//! Speech-recognizer collaborator interface.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::CaptureError;

/// Events emitted by a recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    /// A provisional fragment; may be revised until a final result lands.
    Interim(String),
    /// A finalized transcript fragment.
    Final(String),
    /// The engine failed; terminal for this session.
    Error(String),
    /// The engine finished on its own or after a stop request.
    End,
}

pub type RecognizerStream = Pin<Box<dyn Stream<Item = RecognizerEvent> + Send>>;

/// A native speech-recognition engine.
///
/// Sessions are single-shot (continuous = false) with interim results
/// enabled: `start` opens one recognition session whose events arrive on
/// the returned stream until an `End` or `Error` event.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Open a recognition session.
    async fn start(&self) -> Result<RecognizerStream, CaptureError>;

    /// Ask the running session to finish; the stream ends shortly after.
    async fn stop(&self);
}
