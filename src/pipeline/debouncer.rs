//! Word-confirmation stage.
//!
//! Recognition engines revise partial hypotheses for the same utterance as
//! more audio arrives; forwarding every partial verbatim would flicker and
//! repeat words. A word passes downstream exactly once, the first time it
//! appears unchanged at the same position in two consecutive partials.

use crate::pipeline::stage::{StageSender, WordStage};

#[derive(Debug, Clone)]
struct TrackedWord {
    word: String,
    confirmed: bool,
}

pub struct Debouncer {
    next: StageSender,
    /// Words of the previous partial, in order. Only the worker touches this.
    words: Vec<TrackedWord>,
}

impl Debouncer {
    pub fn new(next: StageSender) -> Self {
        Self {
            next,
            words: Vec::new(),
        }
    }
}

impl WordStage for Debouncer {
    fn on_text(&mut self, text: &str) {
        let updated: Vec<&str> = text.split(' ').collect();
        let shared = self.words.len().min(updated.len());

        let mut next_words = Vec::with_capacity(updated.len());
        let mut confirmed_now = Vec::new();

        for (index, &updated_word) in updated.iter().take(shared).enumerate() {
            let previous = &self.words[index];
            if previous.confirmed {
                next_words.push(previous.clone());
            } else if previous.word == updated_word {
                // Second consecutive sighting: the word is stable.
                confirmed_now.push(previous.word.clone());
                next_words.push(TrackedWord {
                    word: previous.word.clone(),
                    confirmed: true,
                });
            } else {
                // Revised by the engine; track the correction, still unconfirmed.
                next_words.push(TrackedWord {
                    word: updated_word.to_string(),
                    confirmed: false,
                });
            }
        }

        for &word in &updated[shared..] {
            next_words.push(TrackedWord {
                word: word.to_string(),
                confirmed: false,
            });
        }

        self.words = next_words;

        for word in confirmed_now {
            self.next.put_text(&word);
        }
    }

    fn on_end_of_sentence(&mut self) {
        self.words.clear();
        self.next.signal_end_of_sentence();
    }

    fn on_error(&mut self, message: &str) {
        self.next.signal_error(message);
    }

    fn on_reset(&mut self) {
        self.words.clear();
        self.next.reset();
    }
}
