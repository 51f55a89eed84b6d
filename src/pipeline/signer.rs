//! Window fingerprint stage.
//!
//! Folds confirmed words into fixed-size windows and forwards a digest of
//! each window instead of the words themselves. This is the pipeline's
//! privacy boundary: raw text stops here. The digest is XxHash64 — fast by
//! requirement, and explicitly not a cryptographic guarantee.

use crate::pipeline::stage::{StageSender, WordStage};
use std::ops::Range;
use xxhash_rust::xxh64::xxh64;

/// Words accumulated before a fingerprint is cut.
const WINDOW_LEN: usize = 7;

/// The slice of each window that feeds the hash. The four leading words are
/// discarded unhashed; downstream fingerprint comparisons rely on these exact
/// offsets.
const HASHED_WORDS: Range<usize> = 4..7;

pub struct Signer {
    next: StageSender,
    /// Accumulated words of the current window. Only the worker touches this.
    window: Vec<String>,
}

impl Signer {
    pub fn new(next: StageSender) -> Self {
        Self {
            next,
            window: Vec::with_capacity(WINDOW_LEN),
        }
    }
}

impl WordStage for Signer {
    fn on_text(&mut self, word: &str) {
        self.window.push(word.to_string());

        if self.window.len() < WINDOW_LEN {
            return;
        }

        let phrase = self.window[HASHED_WORDS].join(" ");
        self.window.clear();

        let digest = xxh64(phrase.as_bytes(), 0);
        self.next.put_text(&format!("{}: {:X}", phrase, digest));
    }

    fn on_end_of_sentence(&mut self) {
        // A sentence boundary does not flush the window; only reset clears it.
        self.next.signal_end_of_sentence();
    }

    fn on_error(&mut self, message: &str) {
        self.next.signal_error(message);
    }

    fn on_reset(&mut self) {
        self.window.clear();
        self.next.reset();
    }
}
