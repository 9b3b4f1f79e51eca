//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::DEFAULT_MODEL;
use crate::params::SamplingConfig;

/// Environment variable holding the Gemini credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Default parameter values, used when the matching CLI flag is absent.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Sampling parameters sent with every call.
    #[serde(default)]
    pub sampling: SamplingConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
}

/// Default parameter values from config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Default model name or alias.
    pub model: String,
    /// Default image size (`1K`, `2K`, `4K`); unset lets the model decide.
    pub size: Option<String>,
    /// Default output format.
    pub format: String,
    /// Append the image-only instruction to prompts.
    pub augment_prompt: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            size: None,
            format: "png".to_string(),
            augment_prompt: true,
        }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Resolve the credential: explicit value, then environment, then file.
    ///
    /// Returns an empty string when none is configured; the adapter rejects
    /// that before making any call.
    #[must_use]
    pub fn credential(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_string)
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .or_else(|| self.keys.gemini.clone())
            .unwrap_or_default()
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `PIXPROMPT_CONFIG` environment variable
/// 3. `~/.config/pixprompt/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("PIXPROMPT_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/pixprompt/config.toml")
    } else {
        PathBuf::from("pixprompt.toml")
    }
}
