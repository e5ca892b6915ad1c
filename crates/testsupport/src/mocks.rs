use async_trait::async_trait;
use phonebot_llm::{LlmError, LlmResult, Reasoner, SlotExtractor};
use phonebot_models::{Slot, Thought, Turn};
use phonebot_notify::Notifier;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Replies with queued thoughts in order, repeating the last one.
#[derive(Default)]
pub struct ScriptedReasoner {
    script: Mutex<VecDeque<Thought>>,
    seen: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedReasoner {
    pub fn new(thoughts: Vec<Thought>) -> Self {
        Self {
            script: Mutex::new(thoughts.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn always(thought: Thought) -> Self {
        Self::new(vec![thought])
    }

    pub fn say(text: &str) -> Self {
        Self::always(Thought {
            say: text.to_string(),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        lock(&self.seen).len()
    }

    pub fn last_messages(&self) -> Option<Vec<Turn>> {
        lock(&self.seen).last().cloned()
    }
}

#[async_trait]
impl Reasoner for ScriptedReasoner {
    async fn reason(&self, messages: Vec<Turn>) -> LlmResult<Thought> {
        lock(&self.seen).push(messages);
        let mut script = lock(&self.script);
        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        next.ok_or(LlmError::EmptyCompletion)
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Always fails, as an unreachable model provider would.
pub struct FailingReasoner;

#[async_trait]
impl Reasoner for FailingReasoner {
    async fn reason(&self, _messages: Vec<Turn>) -> LlmResult<Thought> {
        Err(LlmError::ServiceUnavailable {
            message: "model offline".to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

/// Treats the whole utterance as the slot value; blank or "none" is a miss.
pub struct EchoSlotExtractor;

#[async_trait]
impl SlotExtractor for EchoSlotExtractor {
    async fn extract(&self, _slot: &Slot, text: &str) -> Option<String> {
        let value = text.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Keeps every e-mail it is asked to send.
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentEmail>>,
    accept: bool,
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            accept: true,
        }
    }

    /// Records messages but reports every delivery as failed.
    pub fn rejecting() -> Self {
        Self {
            accept: false,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_email(&self, to: &str, subject: &str, text: &str) -> bool {
        lock(&self.sent).push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            text: text.to_string(),
        });
        self.accept
    }
}
