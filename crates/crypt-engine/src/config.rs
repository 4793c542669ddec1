//! Engine configuration.
//!
//! Everything here is fixed for the lifetime of a stream. Parameter values
//! are not configuration; they live in the [`ParamStore`](crate::ParamStore).
//!
//! ```toml
//! sample_rate = 44100.0
//! max_block_size = 256
//! scope_capacity = 4096
//! event_capacity = 1024
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Stream and buffer settings for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block the host will ask for.
    pub max_block_size: usize,
    /// Samples held by the scope ring buffer.
    pub scope_capacity: usize,
    /// Note events that can be queued from other threads.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_block_size: 512,
            scope_capacity: 4096,
            event_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::read_config(path, e))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "engine config loaded");
        Ok(config)
    }

    /// Check that the stream settings are usable.
    pub fn validate(&self) -> Result<()> {
        validate_sample_rate(self.sample_rate)?;
        if self.max_block_size == 0 {
            return Err(EngineError::InvalidBlockSize(self.max_block_size));
        }
        if self.scope_capacity == 0 {
            return Err(EngineError::InvalidScopeCapacity(self.scope_capacity));
        }
        Ok(())
    }
}

/// Lowest sample rate a stream may run at (Hz).
pub const MIN_SAMPLE_RATE: f32 = 1000.0;

pub(crate) fn validate_sample_rate(sample_rate: f32) -> Result<()> {
    if sample_rate.is_finite() && sample_rate >= MIN_SAMPLE_RATE {
        Ok(())
    } else {
        Err(EngineError::InvalidSampleRate(sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.sample_rate, 48000.0);
        assert_eq!(config.max_block_size, 512);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = EngineConfig::from_toml_str("sample_rate = 44100.0\n").unwrap();
        assert_eq!(config.sample_rate, 44100.0);
        assert_eq!(config.max_block_size, 512);
        assert_eq!(config.scope_capacity, 4096);
    }

    #[test]
    fn rejects_bad_values() {
        let err = EngineConfig::from_toml_str("sample_rate = -1.0").unwrap_err();
        assert!(matches!(err, EngineError::InvalidSampleRate(_)));

        let err = EngineConfig::from_toml_str("sample_rate = 30.0").unwrap_err();
        assert!(matches!(err, EngineError::InvalidSampleRate(_)));

        let err = EngineConfig::from_toml_str("max_block_size = 0").unwrap_err();
        assert!(matches!(err, EngineError::InvalidBlockSize(0)));

        let err = EngineConfig::from_toml_str("scope_capacity = 0").unwrap_err();
        assert!(matches!(err, EngineError::InvalidScopeCapacity(0)));
        assert_eq!(err.to_string(), "invalid scope capacity: 0");
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = EngineConfig::from_toml_str("sample_rate = \"fast\"").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_block_size = 128\nevent_capacity = 64").unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.max_block_size, 128);
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn load_missing_file() {
        let err = EngineConfig::load("/nonexistent/crypt.toml").unwrap_err();
        assert!(matches!(err, EngineError::ReadConfig { .. }));
    }

    #[test]
    fn toml_round_trip() {
        let config = EngineConfig {
            sample_rate: 96000.0,
            ..EngineConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }
}
