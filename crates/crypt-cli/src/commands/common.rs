//! Shared CLI helpers used across multiple commands.

use std::path::PathBuf;

use clap::Args;
use crypt_engine::{CryptEngine, EngineConfig, EngineHandle, ParamId, ScopeReader, parse_assignment};

/// Parse a `name=value` parameter assignment for clap's `value_parser`.
pub fn parse_param(s: &str) -> Result<(ParamId, f32), String> {
    parse_assignment(s).map_err(|e| e.to_string())
}

/// Parse a velocity in `0.0..=1.0`.
pub fn parse_velocity(s: &str) -> Result<f32, String> {
    let velocity: f32 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&velocity) {
        Ok(velocity)
    } else {
        Err(format!("velocity {velocity} is outside 0..=1"))
    }
}

/// Options shared by every command that builds an engine.
#[derive(Args, Debug, Clone)]
pub struct SynthOptions {
    /// MIDI notes to hold, comma separated
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "57,60,64",
        value_parser = clap::value_parser!(u8).range(0..=127)
    )]
    pub notes: Vec<u8>,

    /// Note velocity (0-1)
    #[arg(long, default_value = "0.8", value_parser = parse_velocity)]
    pub velocity: f32,

    /// Parameter override as name=value (repeatable, see `crypt params`)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_param)]
    pub set: Vec<(ParamId, f32)>,

    /// Engine config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl SynthOptions {
    /// Engine config from `--config`, or the defaults.
    pub fn load_config(&self) -> anyhow::Result<EngineConfig> {
        match &self.config {
            Some(path) => Ok(EngineConfig::load(path)?),
            None => Ok(EngineConfig::default()),
        }
    }

    /// Build an engine, apply overrides and prepare it for `config`'s stream.
    pub fn build_engine(
        &self,
        config: &EngineConfig,
    ) -> anyhow::Result<(CryptEngine, EngineHandle, ScopeReader)> {
        config.validate()?;
        let (mut engine, handle, scope) = CryptEngine::new(config);
        for &(id, value) in &self.set {
            let stored = handle.set_param(id, value);
            if stored != value {
                tracing::warn!(param = %id, requested = value, stored, "value clamped to range");
            }
        }
        engine.prepare(config.sample_rate, config.max_block_size)?;
        Ok((engine, handle, scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_param_accepts_known_names() {
        assert_eq!(parse_param("cutoff=800"), Ok((ParamId::Cutoff, 800.0)));
        assert_eq!(parse_param("AMP.RELEASE = 1.5"), Ok((ParamId::AmpRelease, 1.5)));
    }

    #[test]
    fn parse_param_rejects_bad_input() {
        assert!(parse_param("wobble=1").is_err());
        assert!(parse_param("cutoff").is_err());
        assert!(parse_param("cutoff=loud").is_err());
    }

    #[test]
    fn velocity_range() {
        assert_eq!(parse_velocity("0.5"), Ok(0.5));
        assert!(parse_velocity("1.5").is_err());
        assert!(parse_velocity("x").is_err());
    }

    #[test]
    fn overrides_reach_the_store() {
        let opts = SynthOptions {
            notes: vec![60],
            velocity: 1.0,
            set: vec![(ParamId::Space, 0.9), (ParamId::Cutoff, 1.0)],
            config: None,
        };
        let (engine, handle, _) = opts.build_engine(&EngineConfig::default()).unwrap();
        assert!(engine.is_prepared());
        assert_eq!(handle.param(ParamId::Space), 0.9);
        assert_eq!(handle.param(ParamId::Cutoff), 50.0);
    }
}
