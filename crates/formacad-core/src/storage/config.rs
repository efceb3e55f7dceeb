//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Interval lengths for each technique
//! - Ambient sound defaults (volume, sound, sample rate)
//! - Notification preferences
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::timer::{Durations, Technique};

/// Timer interval configuration, in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_pomodoro_focus")]
    pub pomodoro_focus: u32,
    #[serde(default = "default_custom_focus")]
    pub custom_focus: u32,
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    #[serde(default = "default_long_break")]
    pub long_break: u32,
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default)]
    pub technique: Technique,
}

/// Ambient sound configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default = "default_sound")]
    pub default_sound: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_pomodoro_focus() -> u32 {
    25
}
fn default_custom_focus() -> u32 {
    50
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_volume() -> f64 {
    0.5
}
fn default_sound() -> String {
    "warm-static".into()
}
fn default_sample_rate() -> u32 {
    44_100
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            pomodoro_focus: default_pomodoro_focus(),
            custom_focus: default_custom_focus(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            long_break_interval: default_long_break_interval(),
            technique: Technique::default(),
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            default_sound: default_sound(),
            sample_rate: default_sample_rate(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(unknown());
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit
    /// the field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timer;
        for (key, minutes) in [
            ("timer.pomodoro_focus", t.pomodoro_focus),
            ("timer.custom_focus", t.custom_focus),
            ("timer.short_break", t.short_break),
            ("timer.long_break", t.long_break),
            ("timer.long_break_interval", t.long_break_interval),
        ] {
            if minutes == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "must be positive".into(),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.sound.volume) {
            return Err(ConfigError::InvalidValue {
                key: "sound.volume".into(),
                message: format!("{} is outside 0.0..=1.0", self.sound.volume),
            });
        }
        if self.sound.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                key: "sound.sample_rate".into(),
                message: "must be positive".into(),
            });
        }
        if crate::sound::find(&self.sound.default_sound).is_none() {
            return Err(ConfigError::InvalidValue {
                key: "sound.default_sound".into(),
                message: format!("unknown sound '{}'", self.sound.default_sound),
            });
        }
        Ok(())
    }

    pub fn durations(&self) -> Durations {
        Durations {
            pomodoro_focus: self.timer.pomodoro_focus,
            custom_focus: self.timer.custom_focus,
            short_break: self.timer.short_break,
            long_break: self.timer.long_break,
            long_break_interval: self.timer.long_break_interval,
        }
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[timer]\npomodoro_focus = 30\n").unwrap();
        assert_eq!(parsed.timer.pomodoro_focus, 30);
        assert_eq!(parsed.timer.custom_focus, 50);
        assert_eq!(parsed.sound.default_sound, "warm-static");
        assert!(parsed.notifications.enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.pomodoro_focus").as_deref(), Some("25"));
        assert_eq!(cfg.get("timer.technique").as_deref(), Some("pomodoro"));
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn set_updates_number_bool_and_string() {
        let mut cfg = Config::default();
        cfg.set("sound.volume", "0.7").unwrap();
        cfg.set("notifications.enabled", "false").unwrap();
        cfg.set("sound.default_sound", "light-rain").unwrap();
        cfg.set("timer.technique", "custom").unwrap();
        assert!((cfg.sound.volume - 0.7).abs() < 1e-6);
        assert!(!cfg.notifications.enabled);
        assert_eq!(cfg.sound.default_sound, "light-rain");
        assert_eq!(cfg.timer.technique, Technique::Custom);
    }

    #[test]
    fn volume_reads_back_as_written() {
        let mut cfg = Config::default();
        cfg.set("sound.volume", "0.7").unwrap();
        assert_eq!(cfg.get("sound.volume").as_deref(), Some("0.7"));
        cfg.set("sound.volume", "0.35").unwrap();
        assert_eq!(cfg.get("sound.volume").as_deref(), Some("0.35"));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("timer.nonexistent", "1").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
        assert!(cfg.set("timer", "1").is_err());
    }

    #[test]
    fn set_rejects_invalid_values() {
        let mut cfg = Config::default();
        assert!(cfg.set("notifications.enabled", "maybe").is_err());
        assert!(cfg.set("timer.short_break", "0").is_err());
        assert!(cfg.set("timer.short_break", "2.5").is_err());
        assert!(cfg.set("sound.volume", "1.5").is_err());
        assert!(cfg.set("sound.default_sound", "thunder").is_err());
        assert!(cfg.set("timer.technique", "flowtime").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("timer.long_break_interval", "3").unwrap();
        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timer.long_break_interval, 3);
        assert_eq!(loaded.durations().long_break_interval, 3);
    }

    #[test]
    fn load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
    }
}
