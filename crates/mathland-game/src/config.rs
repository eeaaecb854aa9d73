//! Settings for Math Adventure Land.
//!
//! Settings are read from an optional `mathland.json` file. Every field has
//! a default, so a missing file is not an error.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{ClassLevel, GameConfig, GameMode, Operation, ROUND_CHOICES};
use crate::error::{GameError, Result};

/// The default settings file name.
pub const SETTINGS_FILE_NAME: &str = "mathland.json";

/// Default model for the Gemini provider.
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

/// Default environment variable holding the API key.
fn default_api_key_env() -> String {
    "API_KEY".to_string()
}

/// Default sampling temperature; some variability keeps problems interesting.
const fn default_temperature() -> f32 {
    0.8
}

/// Default HTTP timeout in seconds.
const fn default_request_timeout() -> u64 {
    30
}

/// Default number of generation attempts (one call, no retries).
const fn default_max_attempts() -> u32 {
    1
}

/// Default initial backoff between attempts in milliseconds.
const fn default_retry_backoff() -> u64 {
    500
}

/// Default feedback dwell time in milliseconds.
const fn default_dwell() -> u64 {
    1500
}

/// Text-generation providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Provider {
    /// Google Gemini (default).
    #[default]
    Gemini,
    /// Any OpenAI-compatible chat completions API.
    OpenAi,
}

impl Provider {
    /// Parses a string into a `Provider`, case-insensitively.
    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAi),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Provider {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid provider '{s}': expected one of 'gemini', 'openai'"
            ))
        })
    }
}

impl Serialize for Provider {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let s = match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        };
        serializer.serialize_str(s)
    }
}

/// Pre-selected values for the configuration screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDefaults {
    /// Default class level.
    #[serde(default)]
    pub level: ClassLevel,
    /// Default operation.
    #[serde(default)]
    pub operation: Operation,
    /// Default game mode.
    #[serde(default)]
    pub game_mode: GameMode,
    /// Default round count.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

const fn default_rounds() -> u32 {
    ROUND_CHOICES[0]
}

impl Default for GameDefaults {
    fn default() -> Self {
        Self {
            level: ClassLevel::default(),
            operation: Operation::default(),
            game_mode: GameMode::default(),
            rounds: default_rounds(),
        }
    }
}

impl GameDefaults {
    /// The defaults as a ready-to-play configuration.
    #[must_use]
    pub const fn to_game_config(self) -> GameConfig {
        GameConfig::new(self.level, self.operation, self.game_mode, self.rounds)
    }
}

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Text-generation provider.
    #[serde(default)]
    pub provider: Provider,

    /// Model name passed to the provider.
    #[serde(default = "default_model")]
    pub model: String,

    /// Override for the provider's API base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sampling temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Total generation attempts per batch, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff between attempts in milliseconds, doubled each retry.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// How long round feedback stays visible, in milliseconds.
    #[serde(default = "default_dwell")]
    pub dwell_millis: u64,

    /// Pre-selected configuration values.
    #[serde(default)]
    pub defaults: GameDefaults,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: default_model(),
            base_url: None,
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff(),
            dwell_millis: default_dwell(),
            defaults: GameDefaults::default(),
        }
    }
}

impl Settings {
    /// Loads settings from the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            GameError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads settings from `mathland.json` in a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(SETTINGS_FILE_NAME))
    }

    /// Loads settings from a specific file path.
    ///
    /// If the file does not exist, returns default settings.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ConfigParseError` if the file contains invalid JSON
    /// or invalid enum values, and `GameError::ConfigValidationError` if a
    /// value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.validate()?;
                return Ok(settings);
            }
            Err(e) => {
                return Err(GameError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let settings: Self = serde_json::from_str(&contents)
            .map_err(|e| GameError::config_parse(path, e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates the settings values.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(GameError::config_validation(
                "model must not be empty",
                "Set model in your mathland.json, e.g. \"gemini-2.5-flash\"",
            ));
        }

        if self.api_key_env.trim().is_empty() {
            return Err(GameError::config_validation(
                "apiKeyEnv must not be empty",
                "Set apiKeyEnv to the environment variable holding your API key",
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GameError::config_validation(
                format!("temperature must be between 0 and 2, got {}", self.temperature),
                "Set temperature to a value such as 0.8 in your mathland.json",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(GameError::config_validation(
                "requestTimeoutSecs must be greater than 0",
                "Set requestTimeoutSecs to at least 1 in your mathland.json",
            ));
        }

        if self.max_attempts == 0 {
            return Err(GameError::config_validation(
                "maxAttempts must be greater than 0",
                "Set maxAttempts to at least 1 in your mathland.json",
            ));
        }

        if self.dwell_millis == 0 {
            return Err(GameError::config_validation(
                "dwellMillis must be greater than 0",
                "Set dwellMillis to 1500 in your mathland.json",
            ));
        }

        if !ROUND_CHOICES.contains(&self.defaults.rounds) {
            return Err(GameError::config_validation(
                format!("defaults.rounds must be one of {ROUND_CHOICES:?}"),
                "Set defaults.rounds to 5, 10 or 15 in your mathland.json",
            ));
        }

        if !self.defaults.game_mode.is_enabled() {
            return Err(GameError::config_validation(
                format!("defaults.gameMode '{}' is not playable yet", self.defaults.game_mode),
                "Set defaults.gameMode to treasure_hunt or balloon_pop",
            ));
        }

        Ok(())
    }

    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Feedback dwell interval as a `Duration`.
    #[must_use]
    pub const fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_millis)
    }

    /// Initial retry backoff as a `Duration`.
    #[must_use]
    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
