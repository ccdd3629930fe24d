//! TOML-based gate policy configuration.
//!
//! Stored at `~/.config/frictionscreen/config.toml`:
//!
//! ```toml
//! read_threshold = 3
//! cooldown_days = 7
//! enabled = true
//! require_connectivity = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::store::data_dir;

/// Policy parameters for a [`Gate`](crate::Gate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// The screen becomes eligible once retained events exceed this count.
    #[serde(default = "default_read_threshold")]
    pub read_threshold: u32,
    /// Length of the counting window and of the post-display cooldown.
    #[serde(default = "default_cooldown_days")]
    pub cooldown_days: u32,
    /// When false every gate operation is a no-op.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Only show the screen while the host reports network connectivity.
    #[serde(default = "default_true")]
    pub require_connectivity: bool,
}

fn default_read_threshold() -> u32 {
    3
}
fn default_cooldown_days() -> u32 {
    7
}
fn default_true() -> bool {
    true
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            read_threshold: default_read_threshold(),
            cooldown_days: default_cooldown_days(),
            enabled: true,
            require_connectivity: true,
        }
    }
}

impl GateConfig {
    pub fn new(read_threshold: u32, cooldown_days: u32) -> Self {
        Self {
            read_threshold,
            cooldown_days,
            ..Self::default()
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn require_connectivity(mut self, required: bool) -> Self {
        self.require_connectivity = required;
        self
    }

    /// Check value ranges the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                key: "read_threshold".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/frictionscreen"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// validated, or if the default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: GateConfig = toml::from_str(&content)
                    .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to `path` as TOML.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as a string.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "read_threshold" => Some(self.read_threshold.to_string()),
            "cooldown_days" => Some(self.cooldown_days.to_string()),
            "enabled" => Some(self.enabled.to_string()),
            "require_connectivity" => Some(self.require_connectivity.to_string()),
            _ => None,
        }
    }

    /// Set a config value from its string form. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value does not parse, or
    /// the resulting config is invalid. The config is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut next = self.clone();
        match key {
            "read_threshold" => next.read_threshold = parse_value(key, value)?,
            "cooldown_days" => next.cooldown_days = parse_value(key, value)?,
            "enabled" => next.enabled = parse_value(key, value)?,
            "require_connectivity" => next.require_connectivity = parse_value(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("cannot parse '{value}': {e}"),
    })
}
