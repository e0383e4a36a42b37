//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, ElevenConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/elevenmusic/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("elevenmusic/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("elevenmusic.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a TOML file and layer its values over `config`.
pub fn load_from_file(path: &Path, config: &mut ElevenConfig) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    apply_toml(&contents, path, config)
}

/// Layer the values present in a TOML document over `config`.
///
/// Keys that are absent leave the existing value alone, so files loaded
/// later only override what they mention.
pub fn apply_toml(contents: &str, path: &Path, config: &mut ElevenConfig) -> Result<(), ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let invalid = |key: &str, expected: &str| ConfigError::Parse {
        path: path.to_path_buf(),
        message: format!("{key} must be {expected}"),
    };

    let string = |section: &toml::Table, key: &str, name: &str| match section.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| invalid(name, "a string")),
    };

    if let Some(api) = table.get("api").and_then(|v| v.as_table()) {
        if let Some(v) = string(api, "api_key", "api.api_key")? {
            config.api.api_key = v;
        }
        if let Some(v) = string(api, "base_url", "api.base_url")? {
            config.api.base_url = v;
        }
        if let Some(v) = api.get("timeout_secs") {
            let secs = v
                .as_integer()
                .filter(|n| *n >= 0)
                .ok_or_else(|| invalid("api.timeout_secs", "a non-negative integer"))?;
            config.api.timeout_secs = secs as u64;
        }
    }

    if let Some(batch) = table.get("batch").and_then(|v| v.as_table()) {
        if let Some(v) = batch.get("continue_on_fail") {
            config.batch.continue_on_fail = v
                .as_bool()
                .ok_or_else(|| invalid("batch.continue_on_fail", "a boolean"))?;
        }
    }

    if let Some(defaults) = table.get("defaults").and_then(|v| v.as_table()) {
        if let Some(v) = string(defaults, "output_format", "defaults.output_format")? {
            config.defaults.output_format = v;
        }
        if let Some(v) = string(defaults, "model_id", "defaults.model_id")? {
            config.defaults.model_id = v;
        }
        if let Some(v) = defaults.get("music_length_seconds") {
            let secs = v
                .as_integer()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| invalid("defaults.music_length_seconds", "a non-negative integer"))?;
            config.defaults.music_length_seconds = secs;
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = string(telemetry, "otlp_endpoint", "telemetry.otlp_endpoint")? {
            config.telemetry.otlp_endpoint = v;
        }
        if let Some(v) = string(telemetry, "log_level", "telemetry.log_level")? {
            config.telemetry.log_level = v;
        }
    }

    Ok(())
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut ElevenConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, |key| env::var(key).ok());
}

/// Apply overrides using an arbitrary variable lookup.
pub fn apply_overrides_from<F>(config: &mut ElevenConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let mut take = |key: &str| {
        let value = lookup(key)?;
        sources.env_overrides.push(key.to_string());
        Some(value)
    };

    // Credentials
    if let Some(v) = take("ELEVENLABS_API_KEY") {
        config.api.api_key = v;
    }
    if let Some(v) = take("ELEVENMUSIC_BASE_URL") {
        config.api.base_url = v;
    }
    if let Some(v) = take("ELEVENMUSIC_TIMEOUT_SECS") {
        if let Ok(secs) = v.parse() {
            config.api.timeout_secs = secs;
        }
    }

    // Batch
    if let Some(v) = take("ELEVENMUSIC_CONTINUE_ON_FAIL") {
        config.batch.continue_on_fail = parse_flag(&v);
    }

    // Defaults
    if let Some(v) = take("ELEVENMUSIC_OUTPUT_FORMAT") {
        config.defaults.output_format = v;
    }
    if let Some(v) = take("ELEVENMUSIC_MODEL_ID") {
        config.defaults.model_id = v;
    }

    // Telemetry
    if let Some(v) = take("ELEVENMUSIC_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = v;
    }
    // Also support standard OTEL env var
    if let Some(v) = take("OTEL_EXPORTER_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = v;
    }
    if let Some(v) = take("ELEVENMUSIC_LOG_LEVEL") {
        config.telemetry.log_level = v;
    }
    // Also support RUST_LOG
    if let Some(v) = take("RUST_LOG") {
        config.telemetry.log_level = v;
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
