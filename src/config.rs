//! Server configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file, then
//! `SKIRMISH_*` environment variables (nested keys split on `__`).

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::combat::{DeathThresholds, Thresholds};
use crate::error::ConfigError;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SKIRMISH_";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Combat tick in milliseconds
    pub tick_interval_ms: u64,
    /// How often skill timers are polled, in milliseconds
    pub skill_pulse_ms: u64,
    /// Seed for replayable fights; entropy when unset
    pub rng_seed: Option<u64>,
    pub player_thresholds: DeathThresholds,
    pub mobile_thresholds: DeathThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            skill_pulse_ms: 100,
            rng_seed: None,
            player_thresholds: DeathThresholds::PLAYER,
            mobile_thresholds: DeathThresholds::MOBILE,
        }
    }
}

impl Config {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let config: Config = figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("tick_interval_ms"));
        }
        if self.skill_pulse_ms == 0 {
            return Err(ConfigError::ZeroInterval("skill_pulse_ms"));
        }
        check_thresholds("player", self.player_thresholds)?;
        check_thresholds("mobile", self.mobile_thresholds)?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn skill_pulse(&self) -> Duration {
        Duration::from_millis(self.skill_pulse_ms)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            player: self.player_thresholds,
            mobile: self.mobile_thresholds,
        }
    }
}

fn check_thresholds(which: &'static str, t: DeathThresholds) -> Result<(), ConfigError> {
    if t.dead > t.incapacitated {
        return Err(ConfigError::InvalidThresholds {
            which,
            dead: t.dead,
            incapacitated: t.incapacitated,
        });
    }
    Ok(())
}
