//! Error types for engine setup and parameter handling.
//!
//! Nothing on the audio path returns these: rendering clamps instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring or controlling the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Sample rate is not finite or below [`MIN_SAMPLE_RATE`](crate::MIN_SAMPLE_RATE)
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f32),

    /// Block size of zero
    #[error("invalid block size: {0}")]
    InvalidBlockSize(usize),

    /// Scope ring of zero samples
    #[error("invalid scope capacity: {0}")]
    InvalidScopeCapacity(usize),

    /// No parameter with this id
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Parameter value could not be parsed
    #[error("invalid value '{value}' for parameter '{name}'")]
    InvalidParameterValue {
        /// Parameter id as given.
        name: String,
        /// Offending value text.
        value: String,
    },

    /// Engine configuration is not valid TOML for [`EngineConfig`](crate::EngineConfig)
    #[error("failed to parse engine config: {0}")]
    Config(#[from] toml::de::Error),

    /// Engine configuration file could not be read
    #[error("failed to read config '{path}': {source}")]
    ReadConfig {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// Create a config read error.
    pub fn read_config(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::ReadConfig {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn read_config_keeps_path_and_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "mock");
        let err = EngineError::read_config("/etc/crypt.toml", io);
        let msg = err.to_string();
        assert!(msg.contains("/etc/crypt.toml"), "got: {msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            EngineError::InvalidSampleRate(0.0).to_string(),
            "invalid sample rate: 0"
        );
        assert_eq!(
            EngineError::UnknownParameter("wobble".into()).to_string(),
            "unknown parameter: wobble"
        );
        let err = EngineError::InvalidParameterValue {
            name: "cutoff".into(),
            value: "loud".into(),
        };
        assert_eq!(err.to_string(), "invalid value 'loud' for parameter 'cutoff'");
        assert!(err.source().is_none());
    }
}
