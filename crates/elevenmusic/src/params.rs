//! Per-item parameter bag.
//!
//! Every field is optional on the wire and unknown fields are ignored.
//! Validation happens when a bag is turned into a typed request, so a batch
//! can carry malformed items and still report them one by one.

use crate::error::{MusicError, Result};
use crate::types::{
    validate_prompt, GenerationRequest, ModelId, MusicLength, Operation, OutputFormat, PlanRequest,
    PromptSource,
};
use elevenconf::DefaultsConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fallbacks for fields an item leaves out.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDefaults {
    pub music_length_seconds: u32,
    pub output_format: String,
    pub model_id: Option<String>,
}

impl Default for ParamDefaults {
    fn default() -> Self {
        Self {
            music_length_seconds: 30,
            output_format: OutputFormat::default().as_str().to_string(),
            model_id: None,
        }
    }
}

impl From<&DefaultsConfig> for ParamDefaults {
    fn from(config: &DefaultsConfig) -> Self {
        Self {
            music_length_seconds: config.music_length_seconds,
            output_format: config.output_format.clone(),
            model_id: config.model_id().map(str::to_string),
        }
    }
}

/// Options shared by all operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    #[serde(default)]
    pub use_composition_plan: bool,

    /// JSON text, or an already-structured document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition_plan: Option<Value>,
}

/// One item's worth of parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    #[serde(default)]
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_length_seconds: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,

    #[serde(default)]
    pub plan_prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_music_length_seconds: Option<u32>,

    #[serde(default)]
    pub additional_options: AdditionalOptions,
}

impl ItemParams {
    /// Parse a bag from arbitrary JSON.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| MusicError::InvalidParams(e.to_string()))
    }

    /// The requested operation; `generateMusic` when none is given.
    pub fn operation(&self) -> Result<Operation> {
        match self.operation.as_deref() {
            None => Ok(Operation::GenerateMusic),
            Some(name) => name.parse(),
        }
    }

    /// Build a request for either generation endpoint.
    ///
    /// A composition plan, when enabled and present, replaces the prompt
    /// entirely and the prompt is not required.
    pub fn generation_request(&self, defaults: &ParamDefaults) -> Result<GenerationRequest> {
        let source = match self.composition_plan()? {
            Some(plan) => PromptSource::Plan(plan),
            None => {
                validate_prompt(&self.prompt)?;
                PromptSource::Text(self.prompt.clone())
            }
        };

        let music_length = MusicLength::from_seconds(
            self.music_length_seconds
                .unwrap_or(defaults.music_length_seconds),
        )?;

        let output_format = self
            .output_format
            .as_deref()
            .unwrap_or(&defaults.output_format)
            .parse()?;

        Ok(GenerationRequest {
            source,
            music_length,
            model_id: self.model_id(defaults)?,
            output_format,
        })
    }

    /// Build a composition-plan request from the plan-specific fields.
    pub fn plan_request(&self, defaults: &ParamDefaults) -> Result<PlanRequest> {
        validate_prompt(&self.plan_prompt)?;

        let music_length = MusicLength::from_seconds(
            self.plan_music_length_seconds
                .unwrap_or(defaults.music_length_seconds),
        )?;

        Ok(PlanRequest {
            prompt: self.plan_prompt.clone(),
            music_length,
            model_id: self.model_id(defaults)?,
        })
    }

    fn model_id(&self, defaults: &ParamDefaults) -> Result<Option<ModelId>> {
        self.additional_options
            .model_id
            .as_deref()
            .or(defaults.model_id.as_deref())
            .filter(|id| !id.is_empty())
            .map(|id| id.parse::<ModelId>())
            .transpose()
    }

    /// The parsed plan when plan mode is on and a document was supplied.
    fn composition_plan(&self) -> Result<Option<Value>> {
        let options = &self.additional_options;
        if !options.use_composition_plan {
            return Ok(None);
        }

        match &options.composition_plan {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) if text.is_empty() => Ok(None),
            Some(Value::String(text)) => serde_json::from_str(text)
                .map(Some)
                .map_err(MusicError::InvalidCompositionPlan),
            Some(document) => Ok(Some(document.clone())),
        }
    }
}
