use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_GOAL: &str = "Produce a brief, helpful reply and any next tool as JSON.";

/// One chat message, `role` is "user", "assistant" or "system".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: String,
    pub content: String,
}

impl Turn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReasonRequest {
    #[serde(default)]
    pub messages: Vec<Turn>,
    #[serde(default = "default_goal")]
    pub goal: String,
}

fn default_goal() -> String {
    DEFAULT_GOAL.to_string()
}

impl ReasonRequest {
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|t| t.role == "user")
            .map(|t| t.content.as_str())
    }
}

/// What the model wants to say next, and optionally which tool to run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Thought {
    pub say: String,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub args: Option<Map<String, Value>>,
}

impl Thought {
    pub fn args_or_empty(&self) -> Map<String, Value> {
        self.args.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActResponse {
    pub say: String,
    pub tool: Option<String>,
    pub args: Option<Map<String, Value>>,
    pub tool_result: Option<Value>,
    pub followup_quote: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default)]
    pub filename: Option<String>,
}
