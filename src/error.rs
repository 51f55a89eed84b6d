//! Error types for speechseal.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeechSealError {
    // Buffer errors
    #[error("Unable to append {length} bytes from index {offset} as source is only {source_len} bytes")]
    SourceOutOfBounds {
        offset: usize,
        length: usize,
        source_len: usize,
    },

    #[error("Stream is closed")]
    StreamClosed,

    // Session / recorder lifecycle errors
    #[error("The {component} has already been started")]
    AlreadyRunning { component: &'static str },

    #[error("Only mono or stereo data are supported, got {channels} channels")]
    UnsupportedChannelCount { channels: u16 },

    // Engine hypothesis errors
    #[error("Malformed hypothesis: {0}")]
    Hypothesis(#[from] serde_json::Error),

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // WAV capture errors
    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SpeechSealError>;
