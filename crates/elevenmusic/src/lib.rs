//! Client for the ElevenLabs Music API.
//!
//! Three operations are exposed, each taking one item's worth of
//! parameters and making at most one HTTP call:
//!
//! - `generateMusic` - POST `/v1/music`, audio back as base64
//! - `generateMusicDetailed` - POST `/v1/music/detailed`, same shape plus a
//!   placeholder `metadata` field (the multipart body is not split)
//! - `createCompositionPlan` - POST `/v1/music/plan`, JSON plan back verbatim
//!
//! # Example
//!
//! ```rust,no_run
//! use elevenmusic::{HttpTransport, ItemParams, RequestAdapter};
//!
//! # async fn run() -> Result<(), elevenmusic::MusicError> {
//! let transport = HttpTransport::new("https://api.elevenlabs.io", "sk_...")?;
//! let adapter = RequestAdapter::new(transport);
//!
//! let params = ItemParams::from_value(serde_json::json!({
//!     "prompt": "calm piano",
//!     "musicLengthSeconds": 20,
//! }))?;
//! let result = adapter.generate_music(&params).await?;
//! println!("{} bytes of base64 audio", result.audio_data.len());
//! # Ok(())
//! # }
//! ```
//!
//! Batches go through [`BatchRunner`], which either aborts on the first
//! failing item or records `{error}` in its place and keeps going.

pub mod adapter;
pub mod batch;
pub mod error;
pub mod params;
pub mod telemetry;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use adapter::{decode_audio, OperationOutput, RequestAdapter};
pub use batch::{BatchRunner, ErrorRecord, FailureMode, ItemOutput, ItemRecord, PairedItem};
pub use error::{BatchError, MusicError};
pub use params::{AdditionalOptions, ItemParams, ParamDefaults};
pub use transport::{HttpTransport, MusicTransport, API_KEY_HEADER};
pub use types::{
    GenerationRequest, GenerationResult, ModelId, MusicLength, Operation, OutputFormat,
    PlanRequest, PlanResult, PromptSource,
};
