//! Settings persistence for Splash
//!
//! Stores master volume, particle toggle, background color and the key
//! bindings as TOML.

use serde::{Deserialize, Serialize};
use splash_core::{fold_key, HexColor};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::Value;
use tracing::{debug, warn};

/// Highest master volume, in percent
pub const MAX_VOLUME: u8 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Could not serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// A key on the board and the sound file it plays, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: char,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl KeyBinding {
    pub fn new(key: char, source: impl Into<PathBuf>) -> Self {
        Self {
            key: fold_key(key),
            source: Some(source.into()),
        }
    }

    /// A key that shows visuals but plays nothing
    pub fn silent(key: char) -> Self {
        Self {
            key: fold_key(key),
            source: None,
        }
    }
}

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// 0-100
    pub master_volume: u8,
    pub particle_effects: bool,
    pub background_color: HexColor,
    #[serde(rename = "binding")]
    pub bindings: Vec<KeyBinding>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 50,
            particle_effects: true,
            background_color: HexColor::BLACK,
            bindings: ['q', 'w', 'e', 'a', 's', 'd']
                .into_iter()
                .map(|key| KeyBinding::new(key, format!("sounds/{key}.mp3")))
                .collect(),
        }
    }
}

impl Settings {
    /// Load settings from the default location.
    ///
    /// Returns defaults if the file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        Self::load_or_default(&Self::config_path())
    }

    /// Load settings from `path`, falling back to defaults.
    ///
    /// A file that is not valid TOML is moved to `settings.toml.bak` so the
    /// next save does not overwrite the user's bindings.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => {
                debug!(path = %path.display(), "settings loaded");
                settings
            }
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(ConfigError::Parse(e)) => {
                let backup = path.with_extension("toml.bak");
                match fs::rename(path, &backup) {
                    Ok(()) => warn!(
                        path = %path.display(),
                        backup = %backup.display(),
                        error = %e,
                        "unreadable settings moved aside, using defaults"
                    ),
                    Err(io) => warn!(
                        path = %path.display(),
                        error = %e,
                        backup_error = %io,
                        "unreadable settings, using defaults"
                    ),
                }
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.serialize()?)?;
        Ok(())
    }

    /// Get the default settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("splash")
            .join("settings.toml")
    }

    /// Parse a settings file.
    ///
    /// Only invalid TOML is an error. A setting with a bad value keeps its
    /// default and a bad binding entry is skipped, so one typo does not
    /// cost the rest of the file.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = content.parse()?;
        let mut settings = Settings::default();

        for (name, value) in table {
            match (name.as_str(), value) {
                ("master_volume", Value::Integer(volume)) => {
                    settings.master_volume = volume.clamp(0, i64::from(MAX_VOLUME)) as u8;
                }
                ("particle_effects", Value::Boolean(enabled)) => {
                    settings.particle_effects = enabled;
                }
                ("background_color", Value::String(text)) => match text.parse() {
                    Ok(color) => settings.background_color = color,
                    Err(e) => warn!(value = %text, error = %e, "ignoring background_color"),
                },
                ("binding", Value::Array(entries)) => {
                    settings.bindings = entries
                        .into_iter()
                        .filter_map(|entry| match entry.try_into::<KeyBinding>() {
                            Ok(binding) => Some(binding),
                            Err(e) => {
                                warn!(error = %e, "ignoring binding");
                                None
                            }
                        })
                        .collect();
                }
                (
                    name @ ("master_volume" | "particle_effects" | "background_color" | "binding"),
                    value,
                ) => {
                    warn!(
                        setting = name,
                        kind = value.type_str(),
                        "ignoring setting of wrong type"
                    );
                }
                (name, _) => debug!(setting = name, "unknown setting"),
            }
        }

        Ok(settings.normalized())
    }

    pub fn serialize(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Clamp the volume, fold keys to lowercase and drop repeated keys
    /// (the first binding for a key wins).
    pub fn normalized(mut self) -> Self {
        self.master_volume = self.master_volume.min(MAX_VOLUME);

        let mut seen = HashSet::new();
        self.bindings.retain_mut(|binding| {
            binding.key = fold_key(binding.key);
            let fresh = seen.insert(binding.key);
            if !fresh {
                warn!(key = %binding.key, "duplicate binding ignored");
            }
            fresh
        });
        self
    }

    /// Volume applied to newly started sounds (0.0-1.0)
    pub fn volume_scalar(&self) -> f32 {
        f32::from(self.master_volume) / 100.0
    }

    pub fn binding(&self, key: char) -> Option<&KeyBinding> {
        let key = fold_key(key);
        self.bindings.iter().find(|b| b.key == key)
    }

    /// Point `key` at `source`, appending a binding if the key has none
    pub fn set_binding(&mut self, key: char, source: Option<PathBuf>) {
        let key = fold_key(key);
        match self.bindings.iter_mut().find(|b| b.key == key) {
            Some(binding) => binding.source = source,
            None => self.bindings.push(KeyBinding { key, source }),
        }
    }

    /// Keys on the board, in binding order
    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        self.bindings.iter().map(|b| b.key)
    }
}
