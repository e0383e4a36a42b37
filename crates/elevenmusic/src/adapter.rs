//! Request adapter: item parameters in, uniform result records out.

use crate::error::{MusicError, Result};
use crate::params::{ItemParams, ParamDefaults};
use crate::transport::MusicTransport;
use crate::types::{GenerationRequest, GenerationResult, Operation, PlanRequest, PlanResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;
use serde_json::Value;

pub const MUSIC_PATH: &str = "/v1/music";
pub const MUSIC_DETAILED_PATH: &str = "/v1/music/detailed";
pub const PLAN_PATH: &str = "/v1/music/plan";
pub const USER_PATH: &str = "/v1/user";

/// The detailed endpoint answers with a multipart envelope that is not
/// split apart; results carry this instead of the real metadata.
pub fn detailed_metadata_placeholder() -> Value {
    serde_json::json!({ "note": "Metadata parsing not implemented in this example" })
}

/// Result of any operation, serialized without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
    Generation(GenerationResult),
    Plan(PlanResult),
}

/// Turns item parameters into API calls over a transport.
pub struct RequestAdapter<T> {
    transport: T,
    defaults: ParamDefaults,
}

impl<T: MusicTransport> RequestAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self::with_defaults(transport, ParamDefaults::default())
    }

    pub fn with_defaults(transport: T, defaults: ParamDefaults) -> Self {
        Self {
            transport,
            defaults,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn defaults(&self) -> &ParamDefaults {
        &self.defaults
    }

    /// Dispatch on the item's `operation` field.
    pub async fn execute(&self, params: &ItemParams) -> Result<OperationOutput> {
        match params.operation()? {
            Operation::GenerateMusic => self
                .generate_music(params)
                .await
                .map(OperationOutput::Generation),
            Operation::GenerateMusicDetailed => self
                .generate_music_detailed(params)
                .await
                .map(OperationOutput::Generation),
            Operation::CreateCompositionPlan => self
                .create_composition_plan(params)
                .await
                .map(OperationOutput::Plan),
        }
    }

    #[tracing::instrument(skip_all, fields(operation = "generateMusic"))]
    pub async fn generate_music(&self, params: &ItemParams) -> Result<GenerationResult> {
        let request = params.generation_request(&self.defaults)?;
        self.generate(MUSIC_PATH, &request, None).await
    }

    /// Same request as [`generate_music`](Self::generate_music), detailed endpoint.
    ///
    /// The body is returned whole as audio; `metadata` is a placeholder.
    #[tracing::instrument(skip_all, fields(operation = "generateMusicDetailed"))]
    pub async fn generate_music_detailed(&self, params: &ItemParams) -> Result<GenerationResult> {
        let request = params.generation_request(&self.defaults)?;
        self.generate(
            MUSIC_DETAILED_PATH,
            &request,
            Some(detailed_metadata_placeholder()),
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(operation = "createCompositionPlan"))]
    pub async fn create_composition_plan(&self, params: &ItemParams) -> Result<PlanResult> {
        let request = params.plan_request(&self.defaults)?;
        self.plan(&request).await
    }

    /// Send an already-validated generation request.
    pub async fn generate(
        &self,
        path: &str,
        request: &GenerationRequest,
        metadata: Option<Value>,
    ) -> Result<GenerationResult> {
        tracing::debug!(
            output_format = %request.output_format,
            music_length_ms = request.music_length.millis(),
            plan = matches!(request.source, crate::types::PromptSource::Plan(_)),
            "requesting music"
        );

        let audio = self
            .transport
            .post_audio(
                path,
                &[("output_format", request.output_format.as_str())],
                &request.body(),
            )
            .await?;

        Ok(GenerationResult {
            success: true,
            audio_data: BASE64.encode(&audio),
            output_format: request.output_format,
            prompt: request.source.echoed_prompt().to_string(),
            music_length_ms: request.music_length.millis(),
            metadata,
        })
    }

    /// Send an already-validated plan request.
    pub async fn plan(&self, request: &PlanRequest) -> Result<PlanResult> {
        let composition_plan = self.transport.post_json(PLAN_PATH, &request.body()).await?;

        Ok(PlanResult {
            success: true,
            composition_plan,
            prompt: request.prompt.clone(),
            music_length_ms: request.music_length.millis(),
        })
    }

    /// Check the credentials by fetching the account record.
    #[tracing::instrument(skip_all)]
    pub async fn verify_credentials(&self) -> Result<Value> {
        self.transport.get_json(USER_PATH).await
    }
}

/// Decode a result's base64 audio back into bytes.
pub fn decode_audio(result: &GenerationResult) -> Result<Vec<u8>> {
    BASE64
        .decode(&result.audio_data)
        .map_err(|e| MusicError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use crate::types::{OutputFormat, PLAN_PROMPT_PLACEHOLDER};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn params(value: Value) -> ItemParams {
        ItemParams::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn generate_music_example() {
        let transport = RecordingTransport::with_audio(b"ID3fake-mp3");
        let adapter = RequestAdapter::new(transport);

        let result = adapter
            .generate_music(&params(json!({
                "operation": "generateMusic",
                "prompt": "calm piano",
                "musicLengthSeconds": 20,
                "outputFormat": "mp3_44100_128",
            })))
            .await
            .unwrap();

        let calls = adapter.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "/v1/music");
        assert_eq!(
            calls[0].query,
            vec![("output_format".to_string(), "mp3_44100_128".to_string())]
        );
        assert_eq!(
            calls[0].body,
            Some(json!({"prompt": "calm piano", "music_length_ms": 20000}))
        );

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "success": true,
                "audioData": BASE64.encode(b"ID3fake-mp3"),
                "outputFormat": "mp3_44100_128",
                "prompt": "calm piano",
                "musicLengthMs": 20000,
            })
        );
        assert_eq!(decode_audio(&result).unwrap(), b"ID3fake-mp3");
    }

    #[tokio::test]
    async fn validation_happens_before_network() {
        let adapter = RequestAdapter::new(RecordingTransport::with_audio(b""));

        let err = adapter
            .generate_music(&params(json!({"prompt": ""})))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = adapter
            .create_composition_plan(&params(json!({"planPrompt": ""})))
            .await
            .unwrap_err();
        assert!(matches!(err, MusicError::MissingPrompt));

        let err = adapter
            .generate_music(&params(json!({
                "prompt": "x",
                "additionalOptions": {"useCompositionPlan": true, "compositionPlan": "{oops"},
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, MusicError::InvalidCompositionPlan(_)));

        assert!(adapter.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn plan_source_echoes_placeholder() {
        let adapter = RequestAdapter::new(RecordingTransport::with_audio(b"pcm"));

        let result = adapter
            .generate_music(&params(json!({
                "outputFormat": "pcm_44100",
                "additionalOptions": {
                    "modelId": "music_v1",
                    "useCompositionPlan": true,
                    "compositionPlan": "{\"positive_global_styles\": [\"jazz\"]}",
                },
            })))
            .await
            .unwrap();

        assert_eq!(result.prompt, PLAN_PROMPT_PLACEHOLDER);
        assert_eq!(result.output_format, OutputFormat::Pcm_44100);

        let body = adapter.transport().calls()[0].body.clone().unwrap();
        assert_eq!(
            body,
            json!({
                "composition_plan": {"positive_global_styles": ["jazz"]},
                "music_length_ms": 30000,
                "model_id": "music_v1",
            })
        );
    }

    #[tokio::test]
    async fn detailed_keeps_placeholder_metadata() {
        let adapter = RequestAdapter::new(RecordingTransport::with_audio(b"--boundary\r\n..."));

        let result = adapter
            .generate_music_detailed(&params(json!({"prompt": "synthwave"})))
            .await
            .unwrap();

        assert_eq!(adapter.transport().calls()[0].path, "/v1/music/detailed");
        assert_eq!(result.metadata, Some(detailed_metadata_placeholder()));
        assert_eq!(decode_audio(&result).unwrap(), b"--boundary\r\n...");
    }

    #[tokio::test]
    async fn composition_plan_returned_verbatim() {
        let plan = json!({"sections": [{"section_name": "Intro", "duration_ms": 10000}]});
        let adapter = RequestAdapter::new(RecordingTransport::with_json(plan.clone()));

        let result = adapter
            .create_composition_plan(&params(json!({
                "planPrompt": "epic trailer",
                "planMusicLengthSeconds": 60,
            })))
            .await
            .unwrap();

        assert_eq!(result.composition_plan, plan);
        assert_eq!(result.prompt, "epic trailer");
        assert_eq!(result.music_length_ms, 60_000);

        let calls = adapter.transport().calls();
        assert_eq!(calls[0].path, "/v1/music/plan");
        assert!(calls[0].query.is_empty());
        assert_eq!(
            calls[0].body,
            Some(json!({"prompt": "epic trailer", "music_length_ms": 60000}))
        );
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let adapter = RequestAdapter::new(RecordingTransport::failing(401, "invalid api key"));

        let err = adapter
            .generate_music(&params(json!({"prompt": "calm piano"})))
            .await
            .unwrap_err();
        assert!(matches!(err, MusicError::Http { status: 401, .. }));
        assert_eq!(adapter.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn execute_dispatches_and_rejects_unknown() {
        let adapter = RequestAdapter::new(RecordingTransport::with_json(json!({"plan": true})));

        let output = adapter
            .execute(&params(json!({"operation": "createCompositionPlan", "planPrompt": "a"})))
            .await
            .unwrap();
        assert!(matches!(output, OperationOutput::Plan(_)));

        let err = adapter
            .execute(&params(json!({"operation": "transcribe"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown operation: transcribe");
        assert_eq!(adapter.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn verify_credentials_hits_user_endpoint() {
        let adapter = RequestAdapter::new(RecordingTransport::with_json(json!({"user_id": "u1"})));
        let user = adapter.verify_credentials().await.unwrap();
        assert_eq!(user["user_id"], "u1");
        assert_eq!(adapter.transport().calls()[0].path, "/v1/user");
    }
}
