//! Default configuration constants for speechseal.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational cost for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Default channel count. Stereo input is downmixed before buffering.
pub const CHANNELS: u16 = 1;

/// Default sample width. Recognition engines consume 16-bit signed PCM.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Initial capacity of a session byte buffer in bytes.
///
/// Buffers grow on demand and compact as the reader drains them, so a large
/// up-front allocation buys nothing.
pub const INITIAL_BUFFER_CAPACITY: usize = 1024;
