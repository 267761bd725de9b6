//! Audio-upload fallback strategy — buffers raw audio for server-side
//! transcription.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;

use crate::capture::recorder::{AudioClip, AudioFormat, AudioRecorder};
use crate::capture::strategy::{CaptureStrategy, Captured};
use crate::error::CaptureError;

/// Captures raw audio chunks in memory and packages them into a single
/// payload when the attempt ends.
pub struct AudioUpload {
    recorder: Arc<dyn AudioRecorder>,
    format: AudioFormat,
}

impl AudioUpload {
    pub fn new(recorder: Arc<dyn AudioRecorder>, format: AudioFormat) -> Self {
        Self { recorder, format }
    }
}

#[async_trait]
impl CaptureStrategy for AudioUpload {
    fn name(&self) -> &'static str {
        "audio-upload"
    }

    async fn capture(&self) -> Result<Captured, CaptureError> {
        let mut chunks = self.recorder.start().await?;

        let mut buffered: Vec<Vec<u8>> = Vec::new();
        while let Some(chunk) = chunks.next().await {
            buffered.push(chunk);
        }

        let clip = AudioClip::from_chunks(buffered, &self.format.mime_type);
        tracing::debug!(bytes = clip.data.len(), "Capture attempt buffered");
        Ok(Captured::Audio(clip))
    }

    async fn stop(&self) {
        self.recorder.stop().await;
    }
}
