use phonebot_models::{BusinessConfig, ReasonRequest, Slot, Turn};

/// Builds the message list sent to the reasoner: the business context and
/// JSON contract, the goal, then the conversation so far.
pub fn build_reason_messages(business: &BusinessConfig, req: &ReasonRequest) -> Vec<Turn> {
    let hours = business.hours.as_deref().unwrap_or("N/A");
    let system = format!(
        "You are the brain of a phone sales agent for an event-rental business. \
         Business: {}; Hours: {}; Service area prefixes: {:?}. \
         Return STRICT JSON: {{say: string, tool?: string, args?: object}}. \
         Tools: quote, check_availability, create_lead, book. Be concise.",
        business.name, hours, business.service_area
    );

    let mut messages = Vec::with_capacity(req.messages.len() + 2);
    messages.push(Turn::system(system));
    messages.push(Turn::system(format!("Goal: {}", req.goal)));
    messages.extend(req.messages.iter().cloned());
    messages
}

pub fn slot_extraction_prompt(slot: &Slot) -> String {
    format!(
        "You are a precise information extractor. \
         Given a caller's message, extract {}. \
         If it is not present, respond with the single word 'None'. \
         Return ONLY the extracted {} string, no explanations or punctuation.",
        slot.description, slot.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use phonebot_models::DEFAULT_GOAL;

    fn business() -> BusinessConfig {
        BusinessConfig {
            name: "Special Events".to_string(),
            slug: None,
            hours: None,
            service_area: vec!["913*".to_string()],
            warehouse_zip: "91367".to_string(),
            min_order_subtotal: 0.0,
            tax_rate: 0.0,
        }
    }

    #[test]
    fn test_reason_messages_layout() {
        let req = ReasonRequest {
            messages: vec![Turn::user("I need chairs")],
            goal: DEFAULT_GOAL.to_string(),
        };
        let messages = build_reason_messages(&business(), &req);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("Business: Special Events"));
        assert!(messages[0].content.contains("Hours: N/A"));
        assert!(messages[0].content.contains("913*"));
        assert_eq!(messages[1].content, format!("Goal: {}", DEFAULT_GOAL));
        assert_eq!(messages[2], Turn::user("I need chairs"));
    }

    #[test]
    fn test_slot_prompt_mentions_slot() {
        let slot = Slot::required("zip", "What is the zipcode?", "The zip of the event.");
        let prompt = slot_extraction_prompt(&slot);
        assert!(prompt.contains("extract The zip of the event."));
        assert!(prompt.contains("ONLY the extracted zip"));
    }
}
