//! Error types for Lead Assist.

/// Top-level error type for the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Backend API errors.
///
/// Transport and decode failures are converted to user-facing apology
/// messages at the call site — they never propagate past the session.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("Backend returned status {status}")]
    Status { status: u16 },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to build request: {0}")]
    InvalidRequest(String),
}

/// Voice-capture errors. Terminal for the current attempt only — the
/// session stays usable after any of these.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("No capture capability available: {0}")]
    Unavailable(String),

    #[error("Microphone permission denied")]
    PermissionDenied,

    #[error("Speech recognition error: {0}")]
    Recognition(String),
}

/// Result type alias for the client.
pub type Result<T> = std::result::Result<T, Error>;
