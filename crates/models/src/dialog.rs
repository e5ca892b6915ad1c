use crate::reasoning::Turn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A piece of information the call workflow collects from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    pub prompt: String,
    pub description: String,
    pub required: bool,
    pub example: Option<String>,
}

impl Slot {
    pub fn required(name: &str, prompt: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            prompt: prompt.to_string(),
            description: description.to_string(),
            required: true,
            example: None,
        }
    }

    pub fn optional(name: &str, prompt: &str, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, prompt, description)
        }
    }
}

/// Conversation state for a single call, shared by every tenant workflow.
///
/// Slots are kept in insertion order so summaries and e-mails list them the
/// way they were collected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub call_id: String,
    pub caller_number: String,
    pub slots: Vec<(String, String)>,
    pub messages: Vec<Turn>,
    pub say: Option<String>,
    pub step_index: u32,
}

impl SessionState {
    pub fn new(call_id: impl Into<String>, caller_number: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            caller_number: caller_number.into(),
            ..Default::default()
        }
    }

    pub fn add_message(&mut self, role: &str, content: &str) {
        self.messages.push(Turn::new(role, content));
    }

    /// Blank values are ignored so a failed extraction never erases a slot.
    pub fn set_slot(&mut self, key: &str, value: &str) {
        if value.trim().is_empty() {
            return;
        }
        match self.slots.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.slots.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get_slot(&self, key: &str) -> Option<&str> {
        self.slots
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_slot(&self, key: &str) -> bool {
        self.get_slot(key).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn all_required_filled<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().all(|k| self.has_slot(k.as_ref()))
    }

    pub fn summary(&self) -> String {
        if self.slots.is_empty() {
            return "(no details collected yet)".to_string();
        }
        self.slots
            .iter()
            .map(|(k, v)| format!("{}: {}", capitalize(k), v))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn slot_map(&self) -> BTreeMap<String, String> {
        self.slots.iter().cloned().collect()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallTurnRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallTurnResponse {
    pub say: String,
    pub complete: bool,
    pub slots: BTreeMap<String, String>,
}
