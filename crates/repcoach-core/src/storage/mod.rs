mod config;

pub use config::{
    parse_secs, parse_yes_no, KeyValueStore, MemoryStore, Settings, KEY_REP_INTERVAL,
    KEY_SOUNDS_ENABLED, KEY_START_DELAY, KEY_TRAINER,
};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns `~/.config/repcoach[-dev]/` based on REPCOACH_ENV.
///
/// Set REPCOACH_ENV=dev to use the development directory, or
/// REPCOACH_CONFIG_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = match std::env::var_os("REPCOACH_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("REPCOACH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("repcoach-dev")
            } else {
                base_dir.join("repcoach")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
