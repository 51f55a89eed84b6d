//! The engine boundary: byte stream out, hypothesis callbacks in.
//!
//! The recognition engine itself lives outside this crate. A session hands it
//! a blocking [`BufferReader`] to drain and a [`RecognizerBridge`] to report
//! into; everything on this side of that seam is engine-agnostic.

use crate::audio::downmix::StereoDownmixer;
use crate::audio::stream_buffer::{BufferReader, StreamBuffer};
use crate::defaults::INITIAL_BUFFER_CAPACITY;
use crate::error::{Result, SpeechSealError};
use crate::pipeline::stage::StageSender;
use crate::stt::hypothesis;
use std::sync::Arc;

/// An external speech-recognition engine.
pub trait RecognitionEngine: Send {
    /// Begin draining `audio` and reporting hypotheses through `listener`.
    ///
    /// The engine reads `audio` like any blocking byte source; the read side
    /// returns 0 once the session ends.
    fn start(&mut self, audio: BufferReader, listener: RecognizerBridge) -> Result<()>;

    /// Stop decoding. The session marks the byte stream finished before
    /// calling this, so a blocked read wakes up on its own.
    fn stop(&mut self);
}

/// Listener half of the engine boundary: engine callbacks become pipeline
/// events.
pub struct RecognizerBridge {
    words: StageSender,
}

impl RecognizerBridge {
    pub fn new(words: StageSender) -> Self {
        Self { words }
    }

    /// Partial hypothesis callback. Malformed payloads are reported to stderr
    /// and dropped; the pipeline keeps running.
    pub fn on_partial_result(&self, json: &str) {
        match hypothesis::partial_text(json) {
            Ok(Some(text)) => self.words.put_text(&text),
            Ok(None) => {}
            Err(e) => eprintln!("speechseal: unable to read partial result: {}", e),
        }
    }

    /// Utterance-complete callback.
    pub fn on_result(&self, json: &str) {
        match hypothesis::result_text(json) {
            Ok(Some(_)) => self.words.signal_end_of_sentence(),
            Ok(None) => {}
            Err(e) => eprintln!("speechseal: unable to read result: {}", e),
        }
    }

    /// Last result before the engine shuts the stream down.
    pub fn on_final_result(&self, json: &str) {
        self.on_result(json);
    }

    pub fn on_error(&self, message: &str) {
        self.words.signal_error(message);
    }

    pub fn on_timeout(&self) {
        self.words.signal_error("Timeout");
    }
}

/// One recognition session: owns the byte buffer, the channel adaptation and
/// the engine lifecycle. Reusable across recordings via stop/start.
pub struct SpeechSession {
    engine: Box<dyn RecognitionEngine>,
    words: StageSender,
    buffer: Arc<StreamBuffer>,
    channels: u16,
    downmixer: StereoDownmixer,
    running: bool,
}

impl SpeechSession {
    /// Creates a session feeding `words`. `channels` must be 1 or 2; stereo
    /// input is downmixed to its first channel before buffering.
    pub fn new(
        engine: Box<dyn RecognitionEngine>,
        words: StageSender,
        channels: u16,
    ) -> Result<Self> {
        Self::with_capacity(engine, words, channels, INITIAL_BUFFER_CAPACITY)
    }

    pub fn with_capacity(
        engine: Box<dyn RecognitionEngine>,
        words: StageSender,
        channels: u16,
        buffer_capacity: usize,
    ) -> Result<Self> {
        if !(1..=2).contains(&channels) {
            return Err(SpeechSealError::UnsupportedChannelCount { channels });
        }

        Ok(Self {
            engine,
            words,
            buffer: Arc::new(StreamBuffer::new(buffer_capacity)),
            channels,
            downmixer: StereoDownmixer::new(),
            running: false,
        })
    }

    /// Feeds captured audio bytes into the session's buffer.
    pub fn add_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        match self.channels {
            1 => self.buffer.append_all(bytes),
            2 => {
                let mono = self.downmixer.downmix(bytes);
                self.buffer.append_all(mono)
            }
            channels => Err(SpeechSealError::UnsupportedChannelCount { channels }),
        }
    }

    /// Starts recognizing a stream: pipeline head reset, buffer reopened,
    /// frame alignment restarted, then the engine attached.
    ///
    /// An engine that refuses to start surfaces as an error event downstream
    /// as well as in the returned `Result`.
    pub fn start(&mut self) -> Result<()> {
        if self.running {
            return Err(SpeechSealError::AlreadyRunning {
                component: "speech session",
            });
        }

        self.words.reset();
        self.buffer.reset();
        self.downmixer.reset();

        let listener = RecognizerBridge::new(self.words.clone());
        match self.engine.start(self.buffer.reader(), listener) {
            Ok(()) => {
                self.running = true;
                Ok(())
            }
            Err(e) => {
                self.words.signal_error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Ends the session: the stream is marked finished so the engine's reader
    /// drains the remaining bytes and sees a normal end of data, then the
    /// engine is stopped and the buffer closed.
    pub fn stop(&mut self) {
        if !self.running {
            eprintln!("speechseal: stop called on a session that is not running");
            return;
        }

        self.buffer.mark_end_of_stream();
        self.engine.stop();
        self.buffer.close();
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Diagnostic view of the unread audio.
    pub fn buffered_audio(&self) -> Vec<u8> {
        self.buffer.snapshot()
    }
}
