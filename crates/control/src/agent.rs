use crate::pricing::PricingEngine;
use crate::tools::{Tool, ToolRunner};
use phonebot_llm::{build_reason_messages, LlmResult, Reasoner};
use phonebot_models::{ActResponse, BotError, BusinessConfig, ReasonRequest, Thought};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Reasoning step plus tool execution.
#[derive(Clone)]
pub struct Agent {
    reasoner: Arc<dyn Reasoner>,
    runner: ToolRunner,
}

impl Agent {
    pub fn new(reasoner: Arc<dyn Reasoner>, runner: ToolRunner) -> Self {
        Self { reasoner, runner }
    }

    pub fn runner(&self) -> &ToolRunner {
        &self.runner
    }

    pub fn provider_name(&self) -> &'static str {
        self.reasoner.provider_name()
    }

    #[instrument(skip_all, fields(business = %business.name))]
    pub async fn think(&self, business: &BusinessConfig, req: &ReasonRequest) -> LlmResult<Thought> {
        let messages = build_reason_messages(business, req);
        let thought = self.reasoner.reason(messages).await?;
        debug!(tool = ?thought.tool, "Reasoner replied");
        Ok(thought)
    }

    /// Runs the thought's tool. A successful availability check is followed
    /// by a quote on the same arguments; a failing follow-up is dropped.
    pub fn act(&self, engine: &PricingEngine, thought: Thought) -> Result<ActResponse, BotError> {
        let args = thought.args_or_empty();
        let tool_result = match thought.tool.as_deref() {
            Some(tool) => Some(self.runner.run(engine, tool, &args)?),
            None => None,
        };

        let available = tool_result
            .as_ref()
            .and_then(|r| r.get("available"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let followup_quote = if thought.tool.as_deref() == Some(Tool::CheckAvailability.as_str()) && available {
            match self.runner.run(engine, Tool::Quote.as_str(), &args) {
                Ok(quote) => Some(quote),
                Err(e) => {
                    warn!(error = %e, "Follow-up quote skipped");
                    None
                }
            }
        } else {
            None
        };

        Ok(ActResponse {
            say: thought.say,
            tool: thought.tool,
            args: thought.args,
            tool_result,
            followup_quote,
        })
    }
}

fn arg_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Subject and body of the e-mail sent when the dialog creates a lead.
pub fn lead_email(tenant: &str, caller: Option<&str>, args: &Map<String, Value>) -> (String, String) {
    let mut lines = vec![format!("Caller: {}", caller.unwrap_or("(unknown)"))];
    for (key, value) in args {
        lines.push(format!("{}: {}", key, arg_display(value)));
    }
    (format!("New lead for {}", tenant), lines.join("\n"))
}

/// Subject and body of the e-mail sent when reasoning fails mid-dialog.
pub fn incomplete_lead_email(tenant: &str, caller: Option<&str>, last_message: Option<&str>) -> (String, String) {
    let body = format!(
        "Caller: {}\nLast message: {}\n\nThe assistant could not finish this conversation.",
        caller.unwrap_or("(unknown)"),
        last_message.unwrap_or("(none)")
    );
    (format!("Incomplete lead for {}", tenant), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lead_email_lists_every_arg() {
        let args = json!({"name": "Alice", "phone": "555-1234", "items": [{"qty": 5}]});
        let (subject, body) = lead_email("Special Events", Some("8185551234"), args.as_object().unwrap());
        assert_eq!(subject, "New lead for Special Events");
        assert!(body.starts_with("Caller: 8185551234"));
        assert!(body.contains("name: Alice"));
        assert!(body.contains(r#"items: [{"qty":5}]"#));
    }

    #[test]
    fn test_incomplete_email_mentions_last_message() {
        let (subject, body) = incomplete_lead_email("Special Events", None, Some("call me back"));
        assert_eq!(subject, "Incomplete lead for Special Events");
        assert!(body.contains("Caller: (unknown)"));
        assert!(body.contains("Last message: call me back"));
    }
}
