use phonebot_llm::SlotExtractor;
use phonebot_models::{SessionState, Slot};
use phonebot_notify::Notifier;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Result of one caller utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub say: String,
    pub complete: bool,
    /// Set when this step sent the lead summary: whether it was delivered.
    pub email_delivered: Option<bool>,
}

/// Slot-filling call flow: collects the caller's details one prompt at a
/// time and e-mails a summary once every required slot is filled.
pub struct TenantWorkflow {
    tenant_name: String,
    notifications_email: String,
    slots: Vec<Slot>,
    extractor: Arc<dyn SlotExtractor>,
    notifier: Arc<dyn Notifier>,
}

pub fn default_slots() -> Vec<Slot> {
    vec![
        Slot::required("name", "Who am I speaking with?", "The caller's name."),
        Slot::required(
            "phone",
            "Can I get your phone number please?",
            "The best number to reach the caller.",
        ),
        Slot::required("date", "What date is your event?", "The event date."),
        Slot::required("zip", "What is the zipcode of your event?", "The zip of the event."),
        Slot::optional(
            "notes",
            "Is there anything else you'd like us to know?",
            "Extra details or requests.",
        ),
    ]
}

impl TenantWorkflow {
    pub fn new(
        tenant_name: impl Into<String>,
        notifications_email: impl Into<String>,
        extractor: Arc<dyn SlotExtractor>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tenant_name: tenant_name.into(),
            notifications_email: notifications_email.into(),
            slots: default_slots(),
            extractor,
            notifier,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn next_unfilled_slot(&self, session: &SessionState) -> Option<&Slot> {
        self.slots
            .iter()
            .filter(|s| s.required)
            .find(|s| !session.has_slot(&s.name))
    }

    pub fn is_complete(&self, session: &SessionState) -> bool {
        self.next_unfilled_slot(session).is_none()
    }

    #[instrument(skip(self, session, text), fields(call_id = %session.call_id))]
    pub async fn handle_step(&self, session: &mut SessionState, text: &str) -> StepOutcome {
        session.add_message("user", text);
        let outcome = self.advance(session, text).await;
        session.add_message("assistant", &outcome.say);
        session.say = Some(outcome.say.clone());
        session.step_index += 1;
        outcome
    }

    async fn advance(&self, session: &mut SessionState, text: &str) -> StepOutcome {
        let Some(pending) = self.next_unfilled_slot(session).map(|s| s.name.clone()) else {
            let delivered = self.on_complete(session).await;
            return StepOutcome {
                say: format!(
                    "Thanks {}, your details have been received.",
                    session.get_slot("name").unwrap_or_default()
                ),
                complete: true,
                email_delivered: Some(delivered),
            };
        };

        if let Some(slot) = self.slot(&pending) {
            if let Some(value) = self.extractor.extract(slot, text).await {
                session.set_slot(&pending, &value);
                if self.is_complete(session) {
                    let delivered = self.on_complete(session).await;
                    return StepOutcome {
                        say: format!(
                            "Thank you, {}! We've collected everything we need.",
                            session.get_slot("name").unwrap_or_default()
                        ),
                        complete: true,
                        email_delivered: Some(delivered),
                    };
                }
            }
        }

        let say = self
            .next_unfilled_slot(session)
            .map(|s| s.prompt.clone())
            .unwrap_or_default();
        StepOutcome {
            say,
            complete: false,
            email_delivered: None,
        }
    }

    pub fn lead_email_body(session: &SessionState) -> String {
        let caller = if session.caller_number.is_empty() {
            "(unknown)"
        } else {
            session.caller_number.as_str()
        };
        let mut lines = vec![
            format!("Caller: {}", caller),
            String::new(),
            "Collected details:".to_string(),
        ];
        for (key, value) in &session.slots {
            let value = if value.is_empty() { "(missing)" } else { value.as_str() };
            lines.push(format!("- {}: {}", key, value));
        }
        lines.join("\n")
    }

    /// Sends the lead summary; delivery failures are logged, never raised.
    pub async fn on_complete(&self, session: &SessionState) -> bool {
        let subject = format!("New lead for {}", self.tenant_name);
        let body = Self::lead_email_body(session);
        let sent = self
            .notifier
            .send_email(&self.notifications_email, &subject, &body)
            .await;
        if sent {
            info!(
                call_id = %session.call_id,
                to = %self.notifications_email,
                "Lead summary delivered"
            );
        } else {
            error!(call_id = %session.call_id, body = %body, "Lead summary not delivered");
        }
        sent
    }
}
