use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::modules::catalog::Coins;
use crate::modules::error::ConfigError;

pub const SETTINGS_FILE: &str = "config.json";

fn default_prefix() -> String {
    "#".to_string()
}

fn default_cooldown() -> i64 {
    60
}

fn default_starting_balance() -> Coins {
    500
}

fn default_box_min() -> Coins {
    300
}

fn default_box_max() -> Coins {
    3_000
}

fn default_pet_health() -> u32 {
    100
}

/// Runtime knobs. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_cooldown")]
    pub work_cooldown_secs: i64,
    #[serde(default = "default_starting_balance")]
    pub starting_balance: Coins,
    #[serde(default = "default_box_min")]
    pub mystery_box_min: Coins,
    #[serde(default = "default_box_max")]
    pub mystery_box_max: Coins,
    #[serde(default = "default_pet_health")]
    pub pet_health: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            work_cooldown_secs: default_cooldown(),
            starting_balance: default_starting_balance(),
            mystery_box_min: default_box_min(),
            mystery_box_max: default_box_max(),
            pet_health: default_pet_health(),
        }
    }
}

impl Settings {
    pub fn path_in(dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(SETTINGS_FILE)
    }

    /// Read `config.json` from `dir`; a missing or empty file yields defaults.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = Self::path_in(dir);
        if !path.exists() {
            return Ok(Settings::default());
        }

        let bytes = fs::read(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        if bytes.is_empty() {
            return Ok(Settings::default());
        }

        let settings: Settings =
            serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
        let path = Self::path_in(&dir);
        let io_err = |source| ConfigError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(dir.as_ref()).map_err(io_err)?;
        let json = serde_json::to_vec_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(io_err)?;
        Ok(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("prefix must not be empty".into()));
        }
        if self.work_cooldown_secs < 0 {
            return Err(ConfigError::Invalid(
                "work_cooldown_secs must not be negative".into(),
            ));
        }
        if self.mystery_box_min > self.mystery_box_max {
            return Err(ConfigError::Invalid(format!(
                "mystery_box_min ({}) exceeds mystery_box_max ({})",
                self.mystery_box_min, self.mystery_box_max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(Settings::path_in(dir.path()), br#"{ "prefix": "!" }"#).unwrap();
        let settings = Settings::load_from_dir(dir.path()).unwrap();
        assert_eq!(settings.prefix, "!");
        assert_eq!(settings.work_cooldown_secs, 60);
        assert_eq!(settings.starting_balance, 500);
        assert_eq!((settings.mystery_box_min, settings.mystery_box_max), (300, 3_000));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load_from_dir(dir.path()).unwrap(), Settings::default());
    }

    #[test]
    fn inverted_box_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            Settings::path_in(dir.path()),
            br#"{ "mystery_box_min": 10, "mystery_box_max": 5 }"#,
        )
        .unwrap();
        assert!(matches!(
            Settings::load_from_dir(dir.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            work_cooldown_secs: 5,
            ..Settings::default()
        };
        settings.save_to_dir(dir.path()).unwrap();
        assert_eq!(Settings::load_from_dir(dir.path()).unwrap(), settings);
    }
}
