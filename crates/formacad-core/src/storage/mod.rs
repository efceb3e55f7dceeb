mod config;
pub mod database;

pub use config::{Config, NotificationsConfig, SoundConfig, TimerConfig};
pub use database::{Database, SessionRecord};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `FORMACAD_DATA_DIR` overrides the location. Otherwise
/// `~/.config/formacad[-dev]/`, with `FORMACAD_ENV=dev` selecting the
/// development directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FORMACAD_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FORMACAD_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("formacad-dev")
            } else {
                base_dir.join("formacad")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
