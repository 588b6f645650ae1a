//! Session settings and their key-value encoding.
//!
//! Four settings shape a workout session:
//! - trainer voice (`"1"` or `"2"`)
//! - seconds per rep (`"<n>s"`)
//! - whether cue audio plays (`"yes"` / `"no"`)
//! - length of the begin-workout window (`"<n>s"`)
//!
//! Settings are stored as TOML at `~/.config/repcoach/config.toml`, and can
//! also be read from any [`KeyValueStore`] using the string encodings above.
//! Reads never fail a session: missing or malformed values fall back to the
//! documented defaults with a warning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::coach::Trainer;
use crate::error::{ConfigError, CoreError};

pub const KEY_TRAINER: &str = "trainer";
pub const KEY_REP_INTERVAL: &str = "repIntervalSec";
pub const KEY_SOUNDS_ENABLED: &str = "soundsEnabled";
pub const KEY_START_DELAY: &str = "startDelaySec";

/// String-keyed settings storage owned by someone else.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Settings read once per workout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub trainer: Trainer,
    #[serde(default = "default_rep_interval_secs")]
    pub rep_interval_secs: u32,
    #[serde(default = "default_true")]
    pub sounds_enabled: bool,
    #[serde(default = "default_start_delay_secs")]
    pub start_delay_secs: u32,
}

// Default functions
fn default_rep_interval_secs() -> u32 {
    2
}
fn default_start_delay_secs() -> u32 {
    5
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trainer: Trainer::default(),
            rep_interval_secs: default_rep_interval_secs(),
            sounds_enabled: default_true(),
            start_delay_secs: default_start_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingKey {
    Trainer,
    RepInterval,
    SoundsEnabled,
    StartDelay,
}

impl SettingKey {
    fn parse(key: &str) -> Result<Self, ConfigError> {
        match key {
            KEY_TRAINER => Ok(SettingKey::Trainer),
            KEY_REP_INTERVAL | "rep_interval_secs" => Ok(SettingKey::RepInterval),
            KEY_SOUNDS_ENABLED | "sounds_enabled" => Ok(SettingKey::SoundsEnabled),
            KEY_START_DELAY | "start_delay_secs" => Ok(SettingKey::StartDelay),
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }

    fn store_key(self) -> &'static str {
        match self {
            SettingKey::Trainer => KEY_TRAINER,
            SettingKey::RepInterval => KEY_REP_INTERVAL,
            SettingKey::SoundsEnabled => KEY_SOUNDS_ENABLED,
            SettingKey::StartDelay => KEY_START_DELAY,
        }
    }

    const ALL: [SettingKey; 4] = [
        SettingKey::Trainer,
        SettingKey::RepInterval,
        SettingKey::SoundsEnabled,
        SettingKey::StartDelay,
    ];
}

/// Parse `"<n>s"` (the trailing `s` is optional) into a positive second count.
pub fn parse_secs(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix('s').unwrap_or(trimmed);
    digits.parse::<u32>().ok().filter(|n| *n >= 1)
}

/// Parse `"yes"` / `"no"` (and `true` / `false`).
pub fn parse_yes_no(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}

fn encode_secs(secs: u32) -> String {
    format!("{secs}s")
}

fn encode_yes_no(flag: bool) -> String {
    let encoded = if flag { "yes" } else { "no" };
    encoded.to_string()
}

impl Settings {
    /// Read settings from a key-value store, falling back per key.
    ///
    /// Never fails: an unreadable store or malformed value yields the
    /// default for that key.
    pub fn from_store(store: &dyn KeyValueStore) -> Self {
        let mut settings = Settings::default();
        for key in SettingKey::ALL {
            let name = key.store_key();
            let raw = match store.get(name) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(key = name, error = %e, "settings read failed, using default");
                    continue;
                }
            };
            if let Err(e) = settings.apply(key, &raw) {
                tracing::warn!(key = name, error = %e, "malformed setting, using default");
            }
        }
        settings
    }

    /// Write every setting into a key-value store using the string encodings.
    pub fn write_to(&self, store: &mut dyn KeyValueStore) -> Result<(), ConfigError> {
        for (key, value) in self.to_entries() {
            store.set(key, &value)?;
        }
        Ok(())
    }

    /// `(key, encoded value)` pairs in display order.
    pub fn to_entries(&self) -> Vec<(&'static str, String)> {
        SettingKey::ALL
            .into_iter()
            .map(|key| (key.store_key(), self.encoded(key)))
            .collect()
    }

    /// Get a setting in its string encoding. Accepts store keys
    /// (`repIntervalSec`) and field names (`rep_interval_secs`).
    pub fn get(&self, key: &str) -> Option<String> {
        SettingKey::parse(key).ok().map(|k| self.encoded(k))
    }

    /// Set a setting from its string encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse.
    /// Does not persist; call [`Settings::save`] afterwards.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = SettingKey::parse(key)?;
        self.apply(key, value)
    }

    fn encoded(&self, key: SettingKey) -> String {
        match key {
            SettingKey::Trainer => self.trainer.id().to_string(),
            SettingKey::RepInterval => encode_secs(self.rep_interval_secs),
            SettingKey::SoundsEnabled => encode_yes_no(self.sounds_enabled),
            SettingKey::StartDelay => encode_secs(self.start_delay_secs),
        }
    }

    fn apply(&mut self, key: SettingKey, raw: &str) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidValue {
            key: key.store_key().to_string(),
            message: format!("{message}, got '{raw}'"),
        };
        match key {
            SettingKey::Trainer => {
                self.trainer = raw.parse().map_err(|e: String| invalid(&e))?;
            }
            SettingKey::RepInterval => {
                self.rep_interval_secs =
                    parse_secs(raw).ok_or_else(|| invalid("expected a positive \"<n>s\""))?;
            }
            SettingKey::SoundsEnabled => {
                self.sounds_enabled =
                    parse_yes_no(raw).ok_or_else(|| invalid("expected \"yes\" or \"no\""))?;
            }
            SettingKey::StartDelay => {
                self.start_delay_secs =
                    parse_secs(raw).ok_or_else(|| invalid("expected a positive \"<n>s\""))?;
            }
        }
        Ok(())
    }

    /// Replace out-of-range values read from disk with defaults.
    fn sanitized(mut self) -> Self {
        if self.rep_interval_secs == 0 {
            tracing::warn!("rep_interval_secs = 0 in config, using default");
            self.rep_interval_secs = default_rep_interval_secs();
        }
        if self.start_delay_secs == 0 {
            tracing::warn!("start_delay_secs = 0 in config, using default");
            self.start_delay_secs = default_start_delay_secs();
        }
        self
    }

    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let settings: Settings = toml::from_str(&content)?;
                Ok(settings.sanitized())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.save_to(path)?;
                Ok(settings)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning defaults on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not load settings, using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, ConfigError> {
            Err(ConfigError::StoreUnavailable("disk gone".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), ConfigError> {
            Err(ConfigError::StoreUnavailable("disk gone".into()))
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.trainer, Trainer::Alan);
        assert_eq!(s.rep_interval_secs, 2);
        assert!(s.sounds_enabled);
        assert_eq!(s.start_delay_secs, 5);
    }

    #[test]
    fn reads_encoded_values_from_store() {
        let store = MemoryStore::with_entries([
            (KEY_TRAINER, "2"),
            (KEY_REP_INTERVAL, "4s"),
            (KEY_SOUNDS_ENABLED, "no"),
            (KEY_START_DELAY, "3s"),
        ]);
        let s = Settings::from_store(&store);
        assert_eq!(s.trainer, Trainer::Lina);
        assert_eq!(s.rep_interval_secs, 4);
        assert!(!s.sounds_enabled);
        assert_eq!(s.start_delay_secs, 3);
    }

    #[test]
    fn missing_and_malformed_keys_fall_back() {
        let store = MemoryStore::with_entries([(KEY_REP_INTERVAL, "0s"), (KEY_TRAINER, "9")]);
        assert_eq!(Settings::from_store(&store), Settings::default());
        assert_eq!(Settings::from_store(&MemoryStore::new()), Settings::default());
    }

    #[test]
    fn unreadable_store_falls_back() {
        assert_eq!(Settings::from_store(&BrokenStore), Settings::default());
    }

    #[test]
    fn write_to_store_roundtrips() {
        let s = Settings {
            trainer: Trainer::Lina,
            rep_interval_secs: 3,
            sounds_enabled: false,
            start_delay_secs: 2,
        };
        let mut store = MemoryStore::new();
        s.write_to(&mut store).unwrap();
        assert_eq!(store.get(KEY_REP_INTERVAL).unwrap().as_deref(), Some("3s"));
        assert_eq!(store.get(KEY_SOUNDS_ENABLED).unwrap().as_deref(), Some("no"));
        assert_eq!(Settings::from_store(&store), s);
    }

    #[test]
    fn get_and_set_accept_both_key_styles() {
        let mut s = Settings::default();
        assert_eq!(s.get("repIntervalSec").as_deref(), Some("2s"));
        s.set("rep_interval_secs", "5").unwrap();
        assert_eq!(s.get(KEY_REP_INTERVAL).as_deref(), Some("5s"));
        s.set(KEY_SOUNDS_ENABLED, "no").unwrap();
        assert_eq!(s.get("sounds_enabled").as_deref(), Some("no"));
        assert!(s.get("volume").is_none());
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut s = Settings::default();
        assert!(matches!(
            s.set(KEY_START_DELAY, "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            s.set("volume", "3"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn parse_secs_accepts_optional_suffix() {
        assert_eq!(parse_secs("5s"), Some(5));
        assert_eq!(parse_secs(" 12 "), Some(12));
        assert_eq!(parse_secs("0s"), None);
        assert_eq!(parse_secs("-3s"), None);
        assert_eq!(parse_secs("s"), None);
    }

    #[test]
    fn toml_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let s = Settings {
            trainer: Trainer::Lina,
            rep_interval_secs: 3,
            sounds_enabled: false,
            start_delay_secs: 4,
        };
        s.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), s);
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
        assert!(path.exists());
    }

    #[test]
    fn partial_file_fills_defaults_and_sanitizes_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "trainer = \"2\"\nrep_interval_secs = 0\n").unwrap();
        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.trainer, Trainer::Lina);
        assert_eq!(s.rep_interval_secs, 2);
        assert_eq!(s.start_delay_secs, 5);
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "trainer = [").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
