//! Growable blocking byte buffer between the audio producer and the engine reader.
//!
//! The capture side appends bursts of PCM bytes; the recognition engine drains
//! them through a blocking reader at its own pace. Appends never wait on a
//! parked reader, and a parked reader holds no lock.

use crate::error::{Result, SpeechSealError};
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Projected sizes below this double the capacity; larger ones grow linearly.
const DOUBLING_LIMIT: usize = 200_000;

/// Linear growth step once past [`DOUBLING_LIMIT`].
const GROWTH_STEP: usize = 50_000;

/// Lifecycle of a buffer. `reset` is the only way back to `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Open,
    /// Producer finished normally; readers drain the rest, then see end of data.
    EndOfStream,
    /// Stream torn down. Single-byte reads still drain buffered bytes, but bulk
    /// reads refuse to start.
    Closed,
}

impl StreamState {
    fn is_terminal(self) -> bool {
        !matches!(self, StreamState::Open)
    }
}

#[derive(Debug)]
struct BufferInner {
    /// Allocated storage; `len()` is the capacity, not the fill level.
    storage: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
    state: StreamState,
}

impl BufferInner {
    fn available(&self) -> usize {
        self.write_pos - self.read_pos
    }

    /// Shift the unread suffix to offset 0, reclaiming the consumed prefix.
    fn compact(&mut self) {
        self.storage.copy_within(self.read_pos..self.write_pos, 0);
        self.write_pos -= self.read_pos;
        self.read_pos = 0;
    }
}

/// Thread-safe byte buffer with blocking reads.
///
/// One producer thread appends, one consumer thread reads; `available` and
/// `snapshot` may be called from anywhere. A single instance is reusable
/// across recording sessions via [`StreamBuffer::reset`].
pub struct StreamBuffer {
    inner: Mutex<BufferInner>,
    /// Per-instance condition: buffers must never wake each other's readers.
    readable: Condvar,
}

impl StreamBuffer {
    /// Creates a buffer with the given initial capacity. The capacity is a
    /// starting point only; appends grow the storage as needed.
    pub fn new(capacity: usize) -> Self {
        // A zero-byte buffer could never double its way out of the growth loop.
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(BufferInner {
                storage: vec![0; capacity],
                read_pos: 0,
                write_pos: 0,
                state: StreamState::Open,
            }),
            readable: Condvar::new(),
        }
    }

    /// A poisoned lock only means another thread panicked mid-operation; the
    /// position counters are updated after each copy, so the data is intact.
    fn lock(&self) -> MutexGuard<'_, BufferInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copies `length` bytes starting at `offset` in `bytes` into the buffer,
    /// growing storage first when the projected size exceeds capacity.
    ///
    /// A zero-length append is a no-op. Fails fast when `offset + length`
    /// overruns the source slice. Appending is legal in every state; bytes
    /// arriving after close are simply never read.
    pub fn append(&self, bytes: &[u8], offset: usize, length: usize) -> Result<()> {
        if offset.checked_add(length).is_none_or(|end| end > bytes.len()) {
            return Err(SpeechSealError::SourceOutOfBounds {
                offset,
                length,
                source_len: bytes.len(),
            });
        }

        if length == 0 {
            return Ok(());
        }

        let mut inner = self.lock();

        let needed = inner.write_pos + length;
        if inner.storage.len() <= needed {
            // Double for small projected sizes, otherwise grow by a fixed step.
            let mut future = inner.storage.len();
            while future <= needed {
                future = if needed < DOUBLING_LIMIT {
                    future * 2
                } else {
                    future + GROWTH_STEP
                };
            }

            let mut grown = vec![0; future];
            grown[..inner.write_pos].copy_from_slice(&inner.storage[..inner.write_pos]);
            inner.storage = grown;
        }

        let write_pos = inner.write_pos;
        inner.storage[write_pos..write_pos + length].copy_from_slice(&bytes[offset..offset + length]);
        inner.write_pos += length;

        // Data just landed; the reader re-checks availability on wakeup anyway.
        if inner.available() > 0 {
            self.readable.notify_one();
        }

        Ok(())
    }

    /// Appends a whole slice.
    pub fn append_all(&self, bytes: &[u8]) -> Result<()> {
        self.append(bytes, 0, bytes.len())
    }

    /// Returns the next byte, blocking while the buffer is empty and open.
    ///
    /// Returns `None` once the buffer is empty and the stream has ended or been
    /// closed. Buffered bytes are always delivered first, even after `close`.
    pub fn read_byte(&self) -> Option<u8> {
        let mut inner = self.lock();

        while inner.available() == 0 {
            if inner.state.is_terminal() {
                return None;
            }

            // Re-check on wakeup: guards against spurious wakeups.
            inner = self
                .readable
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let byte = inner.storage[inner.read_pos];
        inner.read_pos += 1;

        // Once the consumed prefix reaches 10% of capacity, compact so a
        // long-running stream does not grow without bound.
        if inner.read_pos * 10 >= inner.storage.len() {
            inner.compact();
        }

        Some(byte)
    }

    /// Fills `dest` by repeated single-byte reads, blocking until `dest` is
    /// full or the stream ends. Returns the number of bytes read, 0 at end of
    /// data.
    ///
    /// Fails with [`SpeechSealError::StreamClosed`] when the buffer was closed
    /// before the call; a close landing mid-call does not abort it.
    pub fn read_bulk(&self, dest: &mut [u8]) -> Result<usize> {
        if self.lock().state == StreamState::Closed {
            return Err(SpeechSealError::StreamClosed);
        }

        let mut count = 0;
        while count < dest.len() {
            match self.read_byte() {
                Some(byte) => {
                    dest[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }

        Ok(count)
    }

    /// Closes the stream and wakes all blocked readers. Already-buffered bytes
    /// remain readable through [`StreamBuffer::read_byte`].
    pub fn close(&self) {
        self.lock().state = StreamState::Closed;
        self.readable.notify_all();
    }

    /// Marks normal end of stream without closing, so readers observe end of
    /// data rather than an error. A closed buffer stays closed.
    pub fn mark_end_of_stream(&self) {
        let mut inner = self.lock();
        if inner.state == StreamState::Open {
            inner.state = StreamState::EndOfStream;
        }
        drop(inner);
        self.readable.notify_all();
    }

    /// Number of unread bytes. May be called concurrently with append/read.
    pub fn available(&self) -> usize {
        self.lock().available()
    }

    /// Size of the allocated storage.
    pub fn capacity(&self) -> usize {
        self.lock().storage.len()
    }

    /// Returns a copy of the unread region without consuming it.
    pub fn snapshot(&self) -> Vec<u8> {
        let inner = self.lock();
        inner.storage[inner.read_pos..inner.write_pos].to_vec()
    }

    /// Returns the buffer to its initial empty, open state for reuse across
    /// recording sessions. Storage is kept as-is.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.read_pos = 0;
        inner.write_pos = 0;
        inner.state = StreamState::Open;
    }

    /// Blocking [`io::Read`] view for handing to a recognition engine.
    pub fn reader(self: &Arc<Self>) -> BufferReader {
        BufferReader {
            buffer: Arc::clone(self),
        }
    }
}

/// Lets a recognition engine consume a [`StreamBuffer`] like any blocking byte
/// source.
pub struct BufferReader {
    buffer: Arc<StreamBuffer>,
}

impl io::Read for BufferReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.buffer.read_bulk(buf).map_err(io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn read_all(buffer: &StreamBuffer) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(byte) = buffer.read_byte() {
            out.push(byte);
        }
        out
    }

    #[test]
    fn bytes_come_out_in_append_order() {
        let buffer = StreamBuffer::new(16);
        buffer.append_all(&[1, 2, 3]).unwrap();
        buffer.append_all(&[4]).unwrap();
        buffer.append_all(&[5, 6]).unwrap();
        buffer.mark_end_of_stream();

        assert_eq!(read_all(&buffer), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn fifo_holds_across_chunk_boundaries() {
        let buffer = StreamBuffer::new(8);
        let data: Vec<u8> = (0..=255).collect();

        // Append in uneven chunks, read back as one stream.
        for chunk in data.chunks(7) {
            buffer.append_all(chunk).unwrap();
        }
        buffer.mark_end_of_stream();

        assert_eq!(read_all(&buffer), data);
    }

    #[test]
    fn growth_preserves_unread_bytes() {
        let buffer = StreamBuffer::new(4);
        let data: Vec<u8> = (0..100).collect();
        buffer.append_all(&data).unwrap();
        buffer.mark_end_of_stream();

        assert!(buffer.capacity() >= 100);
        assert_eq!(read_all(&buffer), data);
    }

    #[test]
    fn small_appends_double_the_capacity() {
        let buffer = StreamBuffer::new(16);
        buffer.append_all(&[0; 20]).unwrap();

        // 16 → 32 covers the projected 20 bytes.
        assert_eq!(buffer.capacity(), 32);
    }

    #[test]
    fn large_appends_grow_linearly() {
        let buffer = StreamBuffer::new(1024);
        buffer.append_all(&vec![0; 250_000]).unwrap();

        // Past the doubling limit: 1024 + 5 * 50_000.
        assert_eq!(buffer.capacity(), 251_024);
    }

    #[test]
    fn compaction_does_not_change_the_byte_sequence() {
        // Capacity 10: compaction triggers after every read (read_pos 1 >= 10%).
        let buffer = StreamBuffer::new(10);
        let data: Vec<u8> = (0..50).collect();

        let mut out = Vec::new();
        for chunk in data.chunks(3) {
            buffer.append_all(chunk).unwrap();
            out.push(buffer.read_byte().unwrap());
        }
        buffer.mark_end_of_stream();
        out.extend(read_all(&buffer));

        assert_eq!(out, data);
    }

    #[test]
    fn blocked_reader_wakes_on_append() {
        let buffer = Arc::new(StreamBuffer::new(16));

        let reader = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || buffer.read_byte())
        };

        // Give the reader time to park, then feed it.
        thread::sleep(Duration::from_millis(50));
        buffer.append_all(&[42]).unwrap();

        assert_eq!(reader.join().unwrap(), Some(42));
    }

    #[test]
    fn blocked_reader_wakes_on_close() {
        let buffer = Arc::new(StreamBuffer::new(16));

        let reader = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || buffer.read_byte())
        };

        thread::sleep(Duration::from_millis(50));
        buffer.close();

        assert_eq!(reader.join().unwrap(), None);
    }

    #[test]
    fn end_of_stream_sentinel_repeats() {
        let buffer = StreamBuffer::new(16);
        buffer.append_all(&[1]).unwrap();
        buffer.mark_end_of_stream();

        assert_eq!(buffer.read_byte(), Some(1));
        assert_eq!(buffer.read_byte(), None);
        assert_eq!(buffer.read_byte(), None);
    }

    #[test]
    fn buffered_bytes_drain_even_after_close() {
        let buffer = StreamBuffer::new(16);
        buffer.append_all(&[7, 8]).unwrap();
        buffer.close();

        assert_eq!(buffer.read_byte(), Some(7));
        assert_eq!(buffer.read_byte(), Some(8));
        assert_eq!(buffer.read_byte(), None);
    }

    #[test]
    fn close_is_not_downgraded_by_end_of_stream() {
        let buffer = StreamBuffer::new(16);
        buffer.close();
        buffer.mark_end_of_stream();

        let mut dest = [0u8; 4];
        assert!(matches!(
            buffer.read_bulk(&mut dest),
            Err(SpeechSealError::StreamClosed)
        ));
    }

    #[test]
    fn read_bulk_fails_once_closed() {
        let buffer = StreamBuffer::new(16);
        buffer.append_all(&[1, 2, 3]).unwrap();
        buffer.close();

        let mut dest = [0u8; 3];
        assert!(matches!(
            buffer.read_bulk(&mut dest),
            Err(SpeechSealError::StreamClosed)
        ));
    }

    #[test]
    fn read_bulk_fills_then_reports_end() {
        let buffer = StreamBuffer::new(16);
        buffer.append_all(&[1, 2, 3]).unwrap();
        buffer.mark_end_of_stream();

        let mut dest = [0u8; 8];
        assert_eq!(buffer.read_bulk(&mut dest).unwrap(), 3);
        assert_eq!(&dest[..3], &[1, 2, 3]);
        assert_eq!(buffer.read_bulk(&mut dest).unwrap(), 0);
    }

    #[test]
    fn append_rejects_out_of_bounds_source_range() {
        let buffer = StreamBuffer::new(16);
        let result = buffer.append(&[1, 2, 3], 2, 5);
        assert!(matches!(
            result,
            Err(SpeechSealError::SourceOutOfBounds { .. })
        ));
    }

    #[test]
    fn zero_length_append_is_a_noop() {
        let buffer = StreamBuffer::new(16);
        buffer.append(&[1, 2, 3], 3, 0).unwrap();
        assert_eq!(buffer.available(), 0);
    }

    #[test]
    fn append_honors_offset_and_length() {
        let buffer = StreamBuffer::new(16);
        buffer.append(&[9, 1, 2, 3, 9], 1, 3).unwrap();
        buffer.mark_end_of_stream();
        assert_eq!(read_all(&buffer), vec![1, 2, 3]);
    }

    #[test]
    fn snapshot_copies_without_consuming() {
        let buffer = StreamBuffer::new(16);
        buffer.append_all(&[1, 2, 3]).unwrap();

        assert_eq!(buffer.snapshot(), vec![1, 2, 3]);
        assert_eq!(buffer.available(), 3);
        assert_eq!(buffer.read_byte(), Some(1));
        assert_eq!(buffer.snapshot(), vec![2, 3]);
    }

    #[test]
    fn reset_reopens_the_buffer_for_a_new_session() {
        let buffer = StreamBuffer::new(16);
        buffer.append_all(&[1, 2]).unwrap();
        buffer.mark_end_of_stream();
        assert_eq!(read_all(&buffer), vec![1, 2]);

        buffer.reset();
        buffer.append_all(&[3, 4]).unwrap();
        buffer.mark_end_of_stream();
        assert_eq!(read_all(&buffer), vec![3, 4]);
    }

    #[test]
    fn reset_clears_closed_state() {
        let buffer = StreamBuffer::new(16);
        buffer.close();
        buffer.reset();

        buffer.append_all(&[5]).unwrap();
        let mut dest = [0u8; 1];
        assert_eq!(buffer.read_bulk(&mut dest).unwrap(), 1);
        assert_eq!(dest[0], 5);
    }

    #[test]
    fn concurrent_producer_and_consumer_agree() {
        let buffer = Arc::new(StreamBuffer::new(32));
        let data: Vec<u8> = (0..200u16).map(|i| (i % 251) as u8).collect();

        let producer = {
            let buffer = Arc::clone(&buffer);
            let data = data.clone();
            thread::spawn(move || {
                for chunk in data.chunks(9) {
                    buffer.append_all(chunk).unwrap();
                    thread::sleep(Duration::from_micros(200));
                }
                buffer.mark_end_of_stream();
            })
        };

        let received = read_all(&buffer);
        producer.join().unwrap();

        assert_eq!(received, data);
    }

    #[test]
    fn io_read_adapter_delivers_the_stream() {
        use std::io::Read;

        let buffer = Arc::new(StreamBuffer::new(16));
        buffer.append_all(&[10, 20, 30]).unwrap();
        buffer.mark_end_of_stream();

        let mut reader = buffer.reader();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![10, 20, 30]);
    }

    #[test]
    fn io_read_adapter_surfaces_close_as_error() {
        use std::io::Read;

        let buffer = Arc::new(StreamBuffer::new(16));
        buffer.close();

        let mut reader = buffer.reader();
        let mut dest = [0u8; 4];
        assert!(reader.read(&mut dest).is_err());
    }
}
