//! Speech-to-text boundary: hypothesis payloads and the engine seam.

pub mod hypothesis;
pub mod recognizer;

pub use hypothesis::{PartialHypothesis, ResultHypothesis};
pub use recognizer::{RecognitionEngine, RecognizerBridge, SpeechSession};
