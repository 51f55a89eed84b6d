//! Audio-side plumbing: the producer/consumer byte buffer, channel adaptation
//! and WAV capture.

pub mod downmix;
pub mod stream_buffer;
pub mod wav;

pub use downmix::StereoDownmixer;
pub use stream_buffer::{BufferReader, StreamBuffer};
pub use wav::WaveRecorder;
