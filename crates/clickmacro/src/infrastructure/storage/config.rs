//! TOML-based configuration for clickmacro.
//!
//! The default location is the platform config directory:
//! - Windows:  `%APPDATA%\ClickMacro\config.toml`
//! - Linux:    `~/.config/clickmacro/config.toml` (or `$XDG_CONFIG_HOME`)
//! - macOS:    `~/Library/Application Support/ClickMacro/config.toml`
//!
//! Every field has a serde default, so a partial file (or none at all)
//! yields a working configuration:
//!
//! ```toml
//! [hotkeys]
//! start_recording = "F1"
//! stop_recording = "F2"
//! start_replay = "F3"
//! abort_replay = "F4"
//! quit = "Escape"
//!
//! [replay]
//! loop_count = 1
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use clickmacro_core::LoopCount;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::dispatch_input::{Command, HotkeyMap};
use crate::infrastructure::input_capture::{Key, UnknownKey};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A hotkey names an unknown key or reuses a key bound elsewhere.
    #[error("invalid hotkey `{binding}`: {reason}")]
    InvalidHotkey { binding: String, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub hotkeys: HotkeyConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Key names bound to each command. Matching is case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotkeyConfig {
    #[serde(default = "default_start_recording")]
    pub start_recording: String,
    #[serde(default = "default_stop_recording")]
    pub stop_recording: String,
    #[serde(default = "default_start_replay")]
    pub start_replay: String,
    #[serde(default = "default_abort_replay")]
    pub abort_replay: String,
    #[serde(default = "default_quit")]
    pub quit: String,
}

/// Replay behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplayConfig {
    /// How many times the whole recorded sequence is played. Must be ≥ 1.
    #[serde(default = "default_loop_count")]
    pub loop_count: LoopCount,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"clickmacro=debug"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_start_recording() -> String {
    "F1".to_string()
}
fn default_stop_recording() -> String {
    "F2".to_string()
}
fn default_start_replay() -> String {
    "F3".to_string()
}
fn default_abort_replay() -> String {
    "F4".to_string()
}
fn default_quit() -> String {
    "Escape".to_string()
}
fn default_loop_count() -> LoopCount {
    LoopCount::ONCE
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            start_recording: default_start_recording(),
            stop_recording: default_stop_recording(),
            start_replay: default_start_replay(),
            abort_replay: default_abort_replay(),
            quit: default_quit(),
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            loop_count: default_loop_count(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Builds the hotkey bindings described by `[hotkeys]`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidHotkey`] if a key name is not recognised or two
    /// commands are bound to the same key.
    pub fn hotkey_map(&self) -> Result<HotkeyMap, ConfigError> {
        let h = &self.hotkeys;
        let entries = [
            ("start_recording", &h.start_recording, Command::StartRecording),
            ("stop_recording", &h.stop_recording, Command::StopRecording),
            ("start_replay", &h.start_replay, Command::StartReplay),
            ("abort_replay", &h.abort_replay, Command::RequestAbort),
            ("quit", &h.quit, Command::Quit),
        ];

        let mut map = HotkeyMap::empty();
        for (binding, name, command) in entries {
            let key: Key = name.parse().map_err(|e: UnknownKey| ConfigError::InvalidHotkey {
                binding: binding.to_string(),
                reason: e.to_string(),
            })?;
            if let Some(previous) = map.bind(key, command) {
                return Err(ConfigError::InvalidHotkey {
                    binding: binding.to_string(),
                    reason: format!("{key} is already bound to {}", previous.describe()),
                });
            }
        }
        Ok(map)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default path of the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined from the environment.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(platform_config_dir()
        .ok_or(ConfigError::NoPlatformConfigDir)?
        .join("config.toml"))
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed or a value is invalid.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path` as pretty-printed TOML, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory including the `ClickMacro` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("ClickMacro"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("clickmacro"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("ClickMacro")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("clickmacro_test_{}", Uuid::new_v4()))
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_values() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.hotkeys.start_recording, "F1");
        assert_eq!(cfg.hotkeys.quit, "Escape");
        assert_eq!(cfg.replay.loop_count, LoopCount::ONCE);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_default_hotkeys_build_default_map() {
        let map = AppConfig::default().hotkey_map().unwrap();
        assert_eq!(map, HotkeyMap::default());
    }

    // ── Parsing ───────────────────────────────────────────────────────────────

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_sections_keep_other_defaults() {
        // Arrange
        let toml_str = r#"
[hotkeys]
start_replay = "F9"

[replay]
loop_count = 5
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.hotkeys.start_replay, "F9");
        assert_eq!(cfg.hotkeys.start_recording, "F1");
        assert_eq!(cfg.replay.loop_count.get(), 5);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_zero_loop_count_is_rejected() {
        let result: Result<AppConfig, toml::de::Error> =
            toml::from_str("[replay]\nloop_count = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let result: Result<AppConfig, toml::de::Error> = toml::from_str("[[[ not valid toml");
        assert!(result.is_err());
    }

    // ── Hotkey validation ─────────────────────────────────────────────────────

    #[test]
    fn test_hotkey_map_accepts_case_insensitive_names() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.hotkeys.quit = "esc".to_string();
        cfg.hotkeys.start_replay = "pause".to_string();

        // Act
        let map = cfg.hotkey_map().unwrap();

        // Assert
        assert_eq!(map.command_for(Key::Escape), Some(Command::Quit));
        assert_eq!(map.command_for(Key::Pause), Some(Command::StartReplay));
        assert_eq!(map.command_for(Key::F3), None);
    }

    #[test]
    fn test_hotkey_map_rejects_unknown_key() {
        let mut cfg = AppConfig::default();
        cfg.hotkeys.abort_replay = "Hyper".to_string();

        let result = cfg.hotkey_map();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidHotkey { ref binding, .. }) if binding == "abort_replay"
        ));
    }

    #[test]
    fn test_hotkey_map_rejects_duplicate_binding() {
        let mut cfg = AppConfig::default();
        cfg.hotkeys.stop_recording = "F1".to_string();

        let result = cfg.hotkey_map();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidHotkey { ref binding, .. }) if binding == "stop_recording"
        ));
    }

    // ── File persistence ──────────────────────────────────────────────────────

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let path = temp_dir().join("config.toml");
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_then_load_via_temp_dir() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.replay.loop_count = LoopCount::new(3).unwrap();
        cfg.logging.level = "debug".to_string();

        // Act
        save_config_to(&path, &cfg).unwrap();
        let loaded = load_config_from(&path).unwrap();

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_malformed_file_is_parse_error() {
        // Arrange
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[replay]\nloop_count = \"many\"\n").unwrap();

        // Act
        let result = load_config_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_default_config_path_ends_with_config_toml() {
        // NoPlatformConfigDir is acceptable in a stripped environment.
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("config.toml"), "got {path:?}");
        }
    }
}
