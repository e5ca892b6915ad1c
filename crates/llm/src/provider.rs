use async_trait::async_trait;
use phonebot_models::{Slot, Thought, Turn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Authentication failed")]
    Authentication,

    #[error("Empty completion")]
    EmptyCompletion,

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
}

impl LlmError {
    /// Short variant name, used when reporting reasoning failures to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Network(_) => "NetworkError",
            LlmError::Serialization(_) => "SerializationError",
            LlmError::Io(_) => "IoError",
            LlmError::InvalidConfig { .. } => "InvalidConfig",
            LlmError::ServiceUnavailable { .. } => "ServiceUnavailable",
            LlmError::RateLimit => "RateLimit",
            LlmError::Authentication => "Authentication",
            LlmError::EmptyCompletion => "EmptyCompletion",
            LlmError::Api { .. } => "ApiError",
        }
    }
}

pub type LlmResult<T> = Result<T, LlmError>;

/// Turns a conversation into the agent's next [`Thought`].
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn reason(&self, messages: Vec<Turn>) -> LlmResult<Thought>;

    fn provider_name(&self) -> &'static str;
}

/// Pulls a single slot value out of a caller utterance.
///
/// Implementations swallow their own failures: `None` means "not found".
#[async_trait]
pub trait SlotExtractor: Send + Sync {
    async fn extract(&self, slot: &Slot, text: &str) -> Option<String>;
}
