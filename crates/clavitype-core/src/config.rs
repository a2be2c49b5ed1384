//! Configuration file support for clavitype
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/clavitype/config.toml`
//! - macOS: `~/Library/Application Support/clavitype/config.toml`
//! - Windows: `%APPDATA%\clavitype\config.toml`

use crate::error::{Error, Result};
use crate::keys;
use crate::recognizer::RecognizerSettings;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine configuration
    pub engine: EngineSettings,
    /// MIDI configuration
    pub midi: MidiSettings,
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Err(Error::Config(format!("Config file not found at {:?}", path)))
        }
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the default config file location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "clavitype") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(Error::Config(
                "Could not determine config directory".to_string(),
            ))
        }
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = r#"# clavitype configuration file

[engine]
# Velocity above which a press counts as emphasized (upper case / shifted)
velocity_threshold = 85

# MIDI note number of the chord hold key (41 = F2)
hold_key = 41

# Quiet time in milliseconds before a held cluster is classified
chord_window_ms = 25

# Re-evaluation interval in milliseconds while the hold key is down
tick_ms = 16

# Per-key threshold adjustments for keys that strike louder than the rest
[[engine.velocity_offset]]
key = 47
offset = 10

[midi]
# Client name announced to the MIDI backend
client_name = "clavitype"

# Substring of the input port name to connect to (first port when unset)
# device = "KeyStation"
"#;

        fs::write(&path, content)?;
        Ok(path)
    }

    /// Convert to RecognizerSettings for the engine
    pub fn recognizer_settings(&self) -> RecognizerSettings {
        let velocity_offsets: HashMap<u8, i16> = self
            .engine
            .velocity_offset
            .iter()
            .map(|o| (o.key, o.offset))
            .collect();

        RecognizerSettings {
            velocity_threshold: self.engine.velocity_threshold,
            velocity_offsets,
            hold_key: self.engine.hold_key,
            chord_window: Duration::from_millis(self.engine.chord_window_ms),
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Velocity above which a press counts as emphasized (1-127)
    pub velocity_threshold: u8,
    /// MIDI note number of the chord hold key
    pub hold_key: u8,
    /// Quiet time in milliseconds before a held cluster is classified
    pub chord_window_ms: u64,
    /// Re-evaluation interval in milliseconds while the hold key is down
    pub tick_ms: u64,
    /// Per-key threshold adjustments
    pub velocity_offset: Vec<VelocityOffset>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            velocity_threshold: 85,
            hold_key: keys::DEFAULT_HOLD_KEY,
            chord_window_ms: 25,
            tick_ms: 16,
            velocity_offset: vec![VelocityOffset {
                key: keys::B2,
                offset: 10,
            }],
        }
    }
}

impl EngineSettings {
    /// Interval between re-evaluation ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Per-key velocity threshold adjustment for TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VelocityOffset {
    /// MIDI note number of the key
    pub key: u8,
    /// Amount added to the global threshold for this key
    pub offset: i16,
}

/// MIDI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiSettings {
    /// Client name announced to the MIDI backend
    pub client_name: String,
    /// Substring of the input port name to connect to (first port when unset)
    pub device: Option<String>,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            client_name: "clavitype".to_string(),
            device: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.velocity_threshold, 85);
        assert_eq!(config.engine.hold_key, 41);
        assert_eq!(config.engine.chord_window_ms, 25);
        assert_eq!(config.engine.tick_ms, 16);
        assert_eq!(config.midi.client_name, "clavitype");
        assert!(config.midi.device.is_none());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            parsed.engine.velocity_threshold,
            config.engine.velocity_threshold
        );
        assert_eq!(parsed.engine.velocity_offset.len(), 1);
        assert_eq!(parsed.engine.velocity_offset[0].key, 47);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [engine]
            velocity_threshold = 100

            [midi]
            device = "KeyStation"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.engine.velocity_threshold, 100);
        assert_eq!(parsed.engine.hold_key, 41);
        assert_eq!(parsed.midi.device.as_deref(), Some("KeyStation"));
        assert_eq!(parsed.midi.client_name, "clavitype");
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [engine]
            hold_key = 36
            tick_ms = 20
            "#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.engine.hold_key, 36);
        assert_eq!(config.engine.tick_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_recognizer_settings_conversion() {
        let mut config = Config::default();
        config.engine.velocity_offset.push(VelocityOffset {
            key: 60,
            offset: -5,
        });

        let settings = config.recognizer_settings();
        assert_eq!(settings.velocity_threshold, 85);
        assert_eq!(settings.velocity_offsets.get(&47), Some(&10));
        assert_eq!(settings.velocity_offsets.get(&60), Some(&-5));
        assert_eq!(settings.chord_window, Duration::from_millis(25));
    }
}
