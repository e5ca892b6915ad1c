use crate::prompts::slot_extraction_prompt;
use crate::provider::{LlmError, LlmResult, Reasoner, SlotExtractor};
use async_trait::async_trait;
use phonebot_models::{LlmConfig, Slot, Thought, Turn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// OpenAI-compatible chat completion request
#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Thin client for the chat completion and speech endpoints.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(LlmError::InvalidConfig {
                message: "Base URL must start with http:// or https://".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    pub(crate) fn handle_http_error(err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::ServiceUnavailable {
                message: "Request timeout".to_string(),
            }
        } else if err.is_connect() {
            LlmError::ServiceUnavailable {
                message: "Cannot connect to language model service".to_string(),
            }
        } else {
            LlmError::Network(err)
        }
    }

    pub(crate) async fn check_status(response: reqwest::Response) -> LlmResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 403 => LlmError::Authentication,
            429 => LlmError::RateLimit,
            503 => LlmError::ServiceUnavailable { message: body },
            code => LlmError::Api { status: code, body },
        })
    }

    async fn complete(
        &self,
        messages: &[Turn],
        temperature: Option<f32>,
        max_tokens: u32,
        response_format: Option<Value>,
    ) -> LlmResult<String> {
        debug!("Starting chat completion with model: {}", self.config.model);

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature,
            max_tokens: Some(max_tokens),
            response_format,
        };

        let response = self
            .client
            .post(self.endpoint("/v1/chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::handle_http_error)?;

        let response = Self::check_status(response).await?;
        let body: ChatCompletionResponse = response.json().await.map_err(Self::handle_http_error)?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyCompletion)
    }

    pub(crate) async fn speech(&self, model: &str, voice: &str, input: &str) -> LlmResult<bytes::Bytes> {
        let response = self
            .client
            .post(self.endpoint("/v1/audio/speech"))
            .bearer_auth(&self.config.api_key)
            .json(&json!({ "model": model, "voice": voice, "input": input }))
            .send()
            .await
            .map_err(Self::handle_http_error)?;

        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?)
    }
}

fn thought_response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "Thought",
            "schema": {
                "type": "object",
                "required": ["say"],
                "properties": {
                    "say": {"type": "string"},
                    "tool": {"type": ["string", "null"]},
                    "args": {"type": ["object", "null"]}
                },
                "additionalProperties": false
            }
        }
    })
}

pub struct OpenAiReasoner {
    client: OpenAiClient,
}

impl OpenAiReasoner {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Reasoner for OpenAiReasoner {
    async fn reason(&self, messages: Vec<Turn>) -> LlmResult<Thought> {
        let max_tokens = self.client.config().max_tokens;
        let content = self
            .client
            .complete(&messages, None, max_tokens, Some(thought_response_format()))
            .await?;
        let thought: Thought = serde_json::from_str(&content)?;
        info!(tool = ?thought.tool, "Reasoning completed");
        Ok(thought)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

pub struct OpenAiSlotExtractor {
    client: OpenAiClient,
}

impl OpenAiSlotExtractor {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SlotExtractor for OpenAiSlotExtractor {
    async fn extract(&self, slot: &Slot, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }

        let messages = vec![Turn::system(slot_extraction_prompt(slot)), Turn::user(text)];
        match self.client.complete(&messages, Some(0.0), 25, None).await {
            Ok(result) => parse_extraction(&result),
            Err(e) => {
                warn!(slot = %slot.name, error = %e, "Slot extraction failed");
                None
            }
        }
    }
}

/// `None` (any case) or an empty answer means the slot wasn't mentioned.
pub fn parse_extraction(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_string())
    }
}
