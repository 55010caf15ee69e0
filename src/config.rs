//! Layered application settings
//!
//! Settings are resolved from three layers, later layers overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`netspeed-watcher.toml` in the working directory, or the
//!    path passed with `--config`)
//! 3. Environment variables prefixed with `NSW_`, e.g. `NSW_UNIT=MB/s` or
//!    `NSW_EXTRA_DENYLIST=tailscale,zerotier`
//!
//! Command-line flags are applied on top by the binary.

use config::{Config, Environment, File};
use log::debug;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::collectors::throughput::{AdapterSelector, RateSampler, Smoother, UnitMode};

/// File consulted when no `--config` path is given
pub const DEFAULT_CONFIG_FILE: &str = "netspeed-watcher.toml";

/// Prefix of the environment variables that override file settings
pub const ENV_PREFIX: &str = "NSW";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Resolved settings for the sampling engine and its front ends
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display unit, `auto` or one of `B/s`, `kB/s`, `MB/s`, `Mb/s`
    pub unit: UnitMode,
    /// Seconds between sample ticks
    pub interval_secs: u64,
    /// Weight of the newest sample in the moving average
    pub smoothing_alpha: f64,
    /// Ticks closer together than this repeat the previous result
    pub debounce_secs: f64,
    /// Name fragments excluded from gateway preference, on top of the built-in table
    pub extra_denylist: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unit: UnitMode::Auto,
            interval_secs: 1,
            smoothing_alpha: crate::collectors::throughput::smoother::DEFAULT_ALPHA,
            debounce_secs: crate::collectors::throughput::sampler::DEFAULT_DEBOUNCE_SECS,
            extra_denylist: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads settings from the file layer and the process environment
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with_env(path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("extra_denylist")
    }

    pub(crate) fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let (file, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };
        debug!("Loading settings from {} (required: {})", file.display(), required);

        let settings: Settings = Config::builder()
            .add_source(File::from(file).required(required))
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.interval_secs == 0 {
            return Err(SettingsError::Invalid {
                field: "interval_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            return Err(SettingsError::Invalid {
                field: "smoothing_alpha",
                reason: format!("{} is outside (0, 1]", self.smoothing_alpha),
            });
        }
        if !(self.debounce_secs >= 0.0 && self.debounce_secs.is_finite()) {
            return Err(SettingsError::Invalid {
                field: "debounce_secs",
                reason: format!("{} is not a finite, non-negative number", self.debounce_secs),
            });
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn selector(&self) -> AdapterSelector {
        AdapterSelector::with_extra_denylist(&self.extra_denylist)
    }

    pub fn sampler(&self) -> RateSampler {
        RateSampler::new(Smoother::new(self.smoothing_alpha), self.debounce_secs)
    }
}
