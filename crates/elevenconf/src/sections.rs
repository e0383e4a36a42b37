//! Configuration sections.

use serde::{Deserialize, Serialize};

/// Credentials and endpoint for the music API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key sent as the `xi-api-key` header.
    /// Default: empty (must be configured)
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the API.
    /// Default: https://api.elevenlabs.io
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,

    /// Client-wide request timeout in seconds. 0 leaves it to the HTTP client.
    /// Default: 0
    #[serde(default)]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.elevenlabs.io";

    fn default_base_url() -> String {
        Self::DEFAULT_BASE_URL.to_string()
    }

    /// True when an API key has been supplied.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// The API key with all but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::default_base_url(),
            timeout_secs: 0,
        }
    }
}

/// Batch processing policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Record failed items as `{error}` and keep going instead of aborting.
    /// Default: false
    #[serde(default)]
    pub continue_on_fail: bool,
}

/// Values used when an item or CLI invocation leaves a parameter out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default: mp3_44100_128
    #[serde(default = "DefaultsConfig::default_output_format")]
    pub output_format: String,

    /// Model identifier. Empty means "let the API decide".
    /// Default: empty
    #[serde(default)]
    pub model_id: String,

    /// Default: 30
    #[serde(default = "DefaultsConfig::default_music_length_seconds")]
    pub music_length_seconds: u32,
}

impl DefaultsConfig {
    fn default_output_format() -> String {
        "mp3_44100_128".to_string()
    }

    fn default_music_length_seconds() -> u32 {
        30
    }

    /// Model id if one is configured.
    pub fn model_id(&self) -> Option<&str> {
        let id = self.model_id.trim();
        (!id.is_empty()).then_some(id)
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_format: Self::default_output_format(),
            model_id: String::new(),
            music_length_seconds: Self::default_music_length_seconds(),
        }
    }
}

/// Telemetry and observability configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// OTLP gRPC endpoint. Empty disables export.
    /// Default: empty
    #[serde(default)]
    pub otlp_endpoint: String,

    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }

    pub fn otlp_endpoint(&self) -> Option<&str> {
        let endpoint = self.otlp_endpoint.trim();
        (!endpoint.is_empty()).then_some(endpoint)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: String::new(),
            log_level: Self::default_log_level(),
        }
    }
}
