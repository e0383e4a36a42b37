//! Request and result records for the music API.
//!
//! Everything here is a per-call value: built from one item's parameters,
//! sent, shaped into a result, and dropped.

use crate::error::{MusicError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Longest prompt the API accepts, in characters.
pub const MAX_PROMPT_CHARS: usize = 2000;

/// Shortest track the API will generate, in seconds.
pub const MIN_MUSIC_SECONDS: u32 = 10;

/// Longest track the API will generate, in seconds.
pub const MAX_MUSIC_SECONDS: u32 = 300;

/// Echoed in place of a prompt when a composition plan drove generation.
pub const PLAN_PROMPT_PLACEHOLDER: &str = "Generated from composition plan";

/// Audio encodings offered by the generation endpoints.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "mp3_44100_128")]
    Mp3_44100_128,
    #[serde(rename = "mp3_44100_192")]
    Mp3_44100_192,
    #[serde(rename = "mp3_22050_32")]
    Mp3_22050_32,
    #[serde(rename = "pcm_44100")]
    Pcm_44100,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Mp3_44100_128,
        OutputFormat::Mp3_44100_192,
        OutputFormat::Mp3_22050_32,
        OutputFormat::Pcm_44100,
    ];

    /// Wire name, as used in the `output_format` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Mp3_44100_128 => "mp3_44100_128",
            OutputFormat::Mp3_44100_192 => "mp3_44100_192",
            OutputFormat::Mp3_22050_32 => "mp3_22050_32",
            OutputFormat::Pcm_44100 => "pcm_44100",
        }
    }

    /// Conventional file extension for the encoding.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pcm_44100 => "pcm",
            _ => "mp3",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s.trim())
            .ok_or_else(|| MusicError::InvalidOutputFormat(s.to_string()))
    }
}

/// Generation models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "music_v1")]
    MusicV1,
}

impl ModelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::MusicV1 => "music_v1",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "music_v1" => Ok(ModelId::MusicV1),
            other => Err(MusicError::InvalidModelId(other.to_string())),
        }
    }
}

/// Track length, validated against the API's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MusicLength {
    seconds: u32,
}

impl MusicLength {
    pub fn from_seconds(seconds: u32) -> Result<Self> {
        if !(MIN_MUSIC_SECONDS..=MAX_MUSIC_SECONDS).contains(&seconds) {
            return Err(MusicError::MusicLengthOutOfRange {
                seconds,
                min: MIN_MUSIC_SECONDS,
                max: MAX_MUSIC_SECONDS,
            });
        }
        Ok(Self { seconds })
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// The `music_length_ms` wire value: seconds × 1000, exactly.
    pub fn millis(&self) -> u64 {
        u64::from(self.seconds) * 1000
    }
}

/// What drives generation: a free-text prompt or a composition plan, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PromptSource {
    #[serde(rename = "prompt")]
    Text(String),
    #[serde(rename = "composition_plan")]
    Plan(Value),
}

impl PromptSource {
    /// The prompt echoed back in results.
    pub fn echoed_prompt(&self) -> &str {
        match self {
            PromptSource::Text(prompt) => prompt,
            PromptSource::Plan(_) => PLAN_PROMPT_PLACEHOLDER,
        }
    }
}

/// Rejects empty and over-long prompts.
pub fn validate_prompt(prompt: &str) -> Result<()> {
    if prompt.is_empty() {
        return Err(MusicError::MissingPrompt);
    }
    let len = prompt.chars().count();
    if len > MAX_PROMPT_CHARS {
        return Err(MusicError::PromptTooLong {
            len,
            max: MAX_PROMPT_CHARS,
        });
    }
    Ok(())
}

/// A validated request for either generation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub source: PromptSource,
    pub music_length: MusicLength,
    pub model_id: Option<ModelId>,
    pub output_format: OutputFormat,
}

impl GenerationRequest {
    /// JSON body: `{prompt | composition_plan, music_length_ms, model_id?}`.
    pub fn body(&self) -> Value {
        let body = GenerationBody {
            source: &self.source,
            music_length_ms: self.music_length.millis(),
            model_id: self.model_id,
        };
        // Plain data with string keys always serializes
        serde_json::to_value(body).unwrap_or(Value::Null)
    }
}

#[derive(Serialize)]
struct GenerationBody<'a> {
    #[serde(flatten)]
    source: &'a PromptSource,
    music_length_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<ModelId>,
}

/// A validated composition-plan request. Plans are always prompt-driven.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub prompt: String,
    pub music_length: MusicLength,
    pub model_id: Option<ModelId>,
}

impl PlanRequest {
    /// JSON body: `{prompt, music_length_ms, model_id?}`.
    pub fn body(&self) -> Value {
        let mut body = serde_json::json!({
            "prompt": self.prompt,
            "music_length_ms": self.music_length.millis(),
        });
        if let Some(model_id) = self.model_id {
            body["model_id"] = Value::String(model_id.as_str().to_string());
        }
        body
    }
}

/// Outcome of a generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    /// Raw response body, base64-encoded.
    pub audio_data: String,
    pub output_format: OutputFormat,
    pub prompt: String,
    pub music_length_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Outcome of a composition-plan call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub success: bool,
    /// The API response, untouched.
    pub composition_plan: Value,
    pub prompt: String,
    pub music_length_ms: u64,
}

/// Operations a batch item may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GenerateMusic,
    GenerateMusicDetailed,
    CreateCompositionPlan,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::GenerateMusic => "generateMusic",
            Operation::GenerateMusicDetailed => "generateMusicDetailed",
            Operation::CreateCompositionPlan => "createCompositionPlan",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "generateMusic" => Ok(Operation::GenerateMusic),
            "generateMusicDetailed" => Ok(Operation::GenerateMusicDetailed),
            "createCompositionPlan" => Ok(Operation::CreateCompositionPlan),
            other => Err(MusicError::UnknownOperation(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn millis_is_exact_across_range() {
        for seconds in MIN_MUSIC_SECONDS..=MAX_MUSIC_SECONDS {
            let length = MusicLength::from_seconds(seconds).unwrap();
            assert_eq!(length.millis(), u64::from(seconds) * 1000);
        }
    }

    #[test]
    fn length_outside_range_rejected() {
        assert!(matches!(
            MusicLength::from_seconds(9),
            Err(MusicError::MusicLengthOutOfRange { seconds: 9, .. })
        ));
        assert!(MusicLength::from_seconds(301).is_err());
    }

    #[test]
    fn text_body_has_prompt_only() {
        let request = GenerationRequest {
            source: PromptSource::Text("calm piano".into()),
            music_length: MusicLength::from_seconds(20).unwrap(),
            model_id: None,
            output_format: OutputFormat::default(),
        };
        assert_eq!(
            request.body(),
            json!({"prompt": "calm piano", "music_length_ms": 20000})
        );
    }

    #[test]
    fn plan_body_has_no_prompt() {
        let request = GenerationRequest {
            source: PromptSource::Plan(json!({"sections": []})),
            music_length: MusicLength::from_seconds(30).unwrap(),
            model_id: Some(ModelId::MusicV1),
            output_format: OutputFormat::Pcm_44100,
        };
        let body = request.body();
        assert_eq!(
            body,
            json!({
                "composition_plan": {"sections": []},
                "music_length_ms": 30000,
                "model_id": "music_v1",
            })
        );
        assert!(body.get("prompt").is_none());
        assert_eq!(request.source.echoed_prompt(), PLAN_PROMPT_PLACEHOLDER);
    }

    #[test]
    fn plan_request_body() {
        let request = PlanRequest {
            prompt: "lofi beat".into(),
            music_length: MusicLength::from_seconds(60).unwrap(),
            model_id: Some(ModelId::MusicV1),
        };
        assert_eq!(
            request.body(),
            json!({"prompt": "lofi beat", "music_length_ms": 60000, "model_id": "music_v1"})
        );
    }

    #[test]
    fn output_format_names() {
        for format in OutputFormat::ALL {
            assert_eq!(format.as_str().parse::<OutputFormat>().unwrap(), format);
            assert_eq!(
                serde_json::to_value(format).unwrap(),
                Value::String(format.as_str().into())
            );
        }
        assert!(matches!(
            "wav_48000".parse::<OutputFormat>(),
            Err(MusicError::InvalidOutputFormat(_))
        ));
    }

    #[test]
    fn prompt_validation() {
        assert!(matches!(validate_prompt(""), Err(MusicError::MissingPrompt)));
        assert!(validate_prompt(&"a".repeat(MAX_PROMPT_CHARS)).is_ok());
        assert!(matches!(
            validate_prompt(&"a".repeat(MAX_PROMPT_CHARS + 1)),
            Err(MusicError::PromptTooLong { len: 2001, max: 2000 })
        ));
    }

    #[test]
    fn unknown_operation() {
        assert_eq!(
            "createCompositionPlan".parse::<Operation>().unwrap(),
            Operation::CreateCompositionPlan
        );
        let err = "remixMusic".parse::<Operation>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown operation: remixMusic");
    }

    #[test]
    fn generation_result_json_shape() {
        let result = GenerationResult {
            success: true,
            audio_data: "AAEC".into(),
            output_format: OutputFormat::Mp3_44100_128,
            prompt: "calm piano".into(),
            music_length_ms: 20000,
            metadata: None,
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "success": true,
                "audioData": "AAEC",
                "outputFormat": "mp3_44100_128",
                "prompt": "calm piano",
                "musicLengthMs": 20000,
            })
        );
    }
}
