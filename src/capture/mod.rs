//! Voice capture — two interchangeable capture paths behind one interface.
//!
//! The preferred path drives a native speech recognizer and yields a text
//! transcript; the fallback buffers raw microphone audio and uploads it for
//! server-side transcription. One strategy is selected at session start and
//! used for every attempt; [`VoiceControl`] owns the
//! `Idle → Listening → (Idle | Submitting)` state machine around it.

pub mod control;
pub mod native;
pub mod recognizer;
pub mod recorder;
pub mod strategy;
pub mod upload;

pub use control::{RecordingState, VoiceControl};
pub use native::NativeTranscription;
pub use recognizer::{RecognizerEvent, RecognizerStream, SpeechRecognizer};
pub use recorder::{AudioClip, AudioFormat, AudioRecorder, ChunkStream};
pub use strategy::{select_strategy, CaptureStrategy, Captured};
pub use upload::AudioUpload;
