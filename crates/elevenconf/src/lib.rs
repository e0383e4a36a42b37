//! Configuration loading for elevenmusic.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/elevenmusic/config.toml` (system)
//! 2. `~/.config/elevenmusic/config.toml` (user)
//! 3. `./elevenmusic.toml` (local override, replaced by `--config`)
//! 4. Environment variables (`ELEVENLABS_API_KEY`, `ELEVENMUSIC_*`)
//!
//! # Example Config
//!
//! ```toml
//! [api]
//! api_key = "sk_..."
//! base_url = "https://api.elevenlabs.io"
//! timeout_secs = 0
//!
//! [batch]
//! continue_on_fail = false
//!
//! [defaults]
//! output_format = "mp3_44100_128"
//! model_id = "music_v1"
//! music_length_seconds = 30
//!
//! [telemetry]
//! otlp_endpoint = "127.0.0.1:4317"
//! log_level = "info"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{ApiConfig, BatchConfig, DefaultsConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete elevenmusic configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElevenConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ElevenConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration with an optional explicit file, then apply env overrides.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = ElevenConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::load_from_file(&path, &mut config)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to a TOML string, masking the API key.
    pub fn to_toml(&self) -> String {
        // Build TOML manually for nicer formatting
        let mut output = String::new();

        output.push_str("# elevenmusic configuration\n\n");

        output.push_str("[api]\n");
        output.push_str(&format!("api_key = \"{}\"\n", self.api.masked_api_key()));
        output.push_str(&format!("base_url = \"{}\"\n", self.api.base_url));
        output.push_str(&format!("timeout_secs = {}\n", self.api.timeout_secs));

        output.push_str("\n[batch]\n");
        output.push_str(&format!(
            "continue_on_fail = {}\n",
            self.batch.continue_on_fail
        ));

        output.push_str("\n[defaults]\n");
        output.push_str(&format!(
            "output_format = \"{}\"\n",
            self.defaults.output_format
        ));
        output.push_str(&format!("model_id = \"{}\"\n", self.defaults.model_id));
        output.push_str(&format!(
            "music_length_seconds = {}\n",
            self.defaults.music_length_seconds
        ));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!(
            "otlp_endpoint = \"{}\"\n",
            self.telemetry.otlp_endpoint
        ));
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ElevenConfig::default();
        assert_eq!(config.api.base_url, "https://api.elevenlabs.io");
        assert_eq!(config.defaults.output_format, "mp3_44100_128");
        assert_eq!(config.defaults.music_length_seconds, 30);
        assert!(!config.api.has_api_key());
    }

    #[test]
    fn test_to_toml_masks_key_and_reparses() {
        let mut config = ElevenConfig::default();
        config.api.api_key = "sk_secret_value".to_string();
        let toml = config.to_toml();
        assert!(toml.contains("[api]"));
        assert!(toml.contains("[telemetry]"));
        assert!(!toml.contains("sk_secret_value"));
        assert!(toml.contains("alue\""));

        let mut reparsed = ElevenConfig::default();
        loader::apply_toml(&toml, Path::new("roundtrip.toml"), &mut reparsed).unwrap();
        assert_eq!(reparsed.defaults, config.defaults);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\nmusic_length_seconds = 90").unwrap();

        let (config, sources) = ElevenConfig::load_with_sources_from(Some(file.path())).unwrap();
        assert!(sources.files.iter().any(|p| p == file.path()));
        // Env may override other fields, but nothing overrides the length
        assert_eq!(config.defaults.music_length_seconds, 90);
    }
}
