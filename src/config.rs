//! Configuration loading.

use crate::defaults;
use crate::error::{Result, SpeechSealError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub buffer: BufferConfig,
}

/// Audio format configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

/// Session byte buffer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BufferConfig {
    pub initial_capacity: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            channels: defaults::CHANNELS,
            bits_per_sample: defaults::BITS_PER_SAMPLE,
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_capacity: defaults::INITIAL_BUFFER_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Missing fields use default values; present fields are validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if !(1..=2).contains(&self.audio.channels) {
            return Err(SpeechSealError::ConfigInvalidValue {
                key: "audio.channels".to_string(),
                message: "must be 1 (mono) or 2 (stereo)".to_string(),
            });
        }
        if self.audio.sample_rate == 0 {
            return Err(SpeechSealError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.audio.bits_per_sample != 16 {
            return Err(SpeechSealError::ConfigInvalidValue {
                key: "audio.bits_per_sample".to_string(),
                message: "only 16-bit PCM is supported".to_string(),
            });
        }
        if self.buffer.initial_capacity == 0 {
            return Err(SpeechSealError::ConfigInvalidValue {
                key: "buffer.initial_capacity".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
