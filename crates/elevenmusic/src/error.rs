use thiserror::Error;

/// Errors raised by the request adapter and its transport.
#[derive(Debug, Error)]
pub enum MusicError {
    #[error("Prompt is required")]
    MissingPrompt,

    #[error("Prompt is too long: {len} characters (max {max})")]
    PromptTooLong { len: usize, max: usize },

    #[error("Invalid composition plan JSON")]
    InvalidCompositionPlan(#[source] serde_json::Error),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Music length must be between {min} and {max} seconds, got {seconds}")]
    MusicLengthOutOfRange { seconds: u32, min: u32, max: u32 },

    #[error("Unsupported output format: {0}")]
    InvalidOutputFormat(String),

    #[error("Unsupported model id: {0}")]
    InvalidModelId(String),

    #[error("Invalid item parameters: {0}")]
    InvalidParams(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl MusicError {
    /// True for errors detected locally, before any network call.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            MusicError::Transport(_) | MusicError::Http { .. } | MusicError::Decode(_)
        )
    }
}

/// A batch aborted on the first failing item.
#[derive(Debug, Error)]
#[error("item {item}: {source}")]
pub struct BatchError {
    /// Position of the failing item in the input.
    pub item: usize,
    #[source]
    pub source: MusicError,
}

pub type Result<T> = std::result::Result<T, MusicError>;
