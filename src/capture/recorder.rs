//! Microphone-recorder collaborator interface and the buffered payload.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::CaptureError;

pub type ChunkStream = Pin<Box<dyn Stream<Item = Vec<u8>> + Send>>;

/// A raw audio recorder, used only when no speech recognizer is available.
#[async_trait]
pub trait AudioRecorder: Send + Sync {
    /// Begin recording; chunks arrive on the returned stream.
    ///
    /// Fails with [`CaptureError::PermissionDenied`] when the user refuses
    /// microphone access.
    async fn start(&self) -> Result<ChunkStream, CaptureError>;

    /// Stop recording; the chunk stream ends shortly after.
    async fn stop(&self);
}

/// Capture format for the fallback recorder.
#[derive(Debug, Clone)]
pub struct AudioFormat {
    pub mime_type: String,
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub bits_per_second: u32,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            mime_type: "audio/webm;codecs=opus".to_string(),
            sample_rate_hz: 16_000,
            channels: 1,
            bits_per_second: 16_000,
        }
    }
}

/// One recorded utterance, packaged as a single binary payload.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl AudioClip {
    /// Assemble buffered chunks into one payload.
    pub fn from_chunks(chunks: Vec<Vec<u8>>, mime_type: &str) -> Self {
        Self {
            data: chunks.concat(),
            mime_type: mime_type.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
