//! Streaming WAV capture.
//!
//! A recorder owns its own [`StreamBuffer`] and accepts the same byte feed as
//! a recognition session, so a capture thread can tee audio to disk without
//! touching the recognizer's stream. A dedicated writer thread drains the
//! buffer into a RIFF/WAVE file.

use crate::audio::stream_buffer::StreamBuffer;
use crate::defaults::INITIAL_BUFFER_CAPACITY;
use crate::error::{Result, SpeechSealError};
use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long `stop` waits for the writer thread to drain and finalize.
const WRITER_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

const READ_CHUNK: usize = 4096;

/// Records a PCM byte feed to a WAV file on a background thread.
pub struct WaveRecorder {
    spec: hound::WavSpec,
    path: PathBuf,
    buffer: Arc<StreamBuffer>,
    writer: Option<WriterThread>,
}

struct WriterThread {
    handle: JoinHandle<Result<()>>,
    /// Dropped by the writer thread on exit; disconnection doubles as the
    /// completion signal for the bounded join.
    done_rx: Receiver<()>,
}

impl WaveRecorder {
    pub fn new(
        path: impl Into<PathBuf>,
        sample_rate: u32,
        bits_per_sample: u16,
        channels: u16,
    ) -> Self {
        Self {
            spec: hound::WavSpec {
                channels,
                sample_rate,
                bits_per_sample,
                sample_format: hound::SampleFormat::Int,
            },
            path: path.into(),
            buffer: Arc::new(StreamBuffer::new(INITIAL_BUFFER_CAPACITY)),
            writer: None,
        }
    }

    /// Feeds captured audio bytes. Safe to call from the capture thread while
    /// the writer drains.
    pub fn add_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.buffer.append_all(bytes)
    }

    /// Creates the output file and starts the writer thread.
    pub fn start(&mut self) -> Result<()> {
        if self.writer.is_some() {
            return Err(SpeechSealError::AlreadyRunning {
                component: "wave recorder",
            });
        }

        self.buffer.reset();
        let writer = hound::WavWriter::create(&self.path, self.spec)?;

        let buffer = Arc::clone(&self.buffer);
        let (done_tx, done_rx) = bounded::<()>(0);
        let handle = thread::spawn(move || {
            let result = drain_to_wav(&buffer, writer);
            drop(done_tx);
            result
        });

        self.writer = Some(WriterThread { handle, done_rx });
        Ok(())
    }

    /// Ends the stream, waits (bounded) for the writer to finalize the file,
    /// then closes the buffer.
    pub fn stop(&mut self) -> Result<()> {
        let Some(writer) = self.writer.take() else {
            eprintln!("speechseal: stop called on a wave recorder that is not running");
            return Ok(());
        };

        self.buffer.mark_end_of_stream();

        let finished = matches!(
            writer.done_rx.recv_timeout(WRITER_JOIN_TIMEOUT),
            Err(RecvTimeoutError::Disconnected)
        );

        self.buffer.close();

        if finished {
            writer
                .handle
                .join()
                .map_err(|_| SpeechSealError::Other("wave writer thread panicked".to_string()))?
        } else {
            eprintln!(
                "speechseal: wave writer did not finish within {:?}",
                WRITER_JOIN_TIMEOUT
            );
            Ok(())
        }
    }
}

/// Reads byte pairs from the buffer until end of stream and writes them as
/// little-endian i16 samples. A trailing odd byte cannot form a sample and is
/// dropped.
fn drain_to_wav(
    buffer: &StreamBuffer,
    mut writer: hound::WavWriter<BufWriter<File>>,
) -> Result<()> {
    let mut chunk = [0u8; READ_CHUNK];
    let mut low: Option<u8> = None;

    loop {
        let read = buffer.read_bulk(&mut chunk)?;
        if read == 0 {
            break;
        }

        for &byte in &chunk[..read] {
            match low.take() {
                None => low = Some(byte),
                Some(first) => writer.write_sample(i16::from_le_bytes([first, byte]))?,
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
