//! Hypothesis payloads reported by the recognition engine.
//!
//! Engines report hypotheses as small JSON objects: `{"partial": "..."}` while
//! an utterance is still being spoken, `{"text": "..."}` once it completes.

use crate::error::Result;
use serde::Deserialize;

/// In-progress, possibly-revised transcription of an utterance.
#[derive(Debug, Clone, Deserialize)]
pub struct PartialHypothesis {
    #[serde(default)]
    pub partial: String,
}

/// Completed transcription of an utterance.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultHypothesis {
    #[serde(default)]
    pub text: String,
}

/// Extracts the partial text from a hypothesis payload.
///
/// Returns `None` when the field is missing or blank; fails on malformed JSON.
pub fn partial_text(json: &str) -> Result<Option<String>> {
    let hypothesis: PartialHypothesis = serde_json::from_str(json)?;
    Ok(non_blank(hypothesis.partial))
}

/// Extracts the final text from a result payload.
pub fn result_text(json: &str) -> Result<Option<String>> {
    let hypothesis: ResultHypothesis = serde_json::from_str(json)?;
    Ok(non_blank(hypothesis.text))
}

fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}
