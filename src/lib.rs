//! speechseal - privacy-preserving word stream for live speech recognition
//!
//! Streams live audio bytes into a recognition engine and folds the engine's
//! noisy partial hypotheses into stable confirmed words, then into rolling
//! window fingerprints. Raw text never leaves the pipeline.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod stt;

// Core byte stream (producer → engine reader)
pub use audio::stream_buffer::{BufferReader, StreamBuffer};
pub use audio::wav::WaveRecorder;

// Pipeline (debouncer → signer → sink)
pub use pipeline::Pipeline;
pub use pipeline::sink::{CollectingDisplay, DisplaySurface, StdoutDisplay};
pub use pipeline::stage::{StageQueue, StageSender, WordEvent, WordStage};

// Engine boundary
pub use stt::recognizer::{RecognitionEngine, RecognizerBridge, SpeechSession};

// Error handling
pub use error::{Result, SpeechSealError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
