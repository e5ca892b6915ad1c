pub mod catalog;
pub mod config;
pub mod dialog;
pub mod error;
pub mod quote;
pub mod reasoning;
pub mod tenant;

pub use catalog::*;
pub use config::*;
pub use dialog::*;
pub use error::*;
pub use quote::*;
pub use reasoning::*;
pub use tenant::*;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reason_request_default_goal() {
        let req: ReasonRequest = serde_json::from_value(json!({"messages": []})).unwrap();
        assert_eq!(req.goal, DEFAULT_GOAL);
        assert!(req.last_user_message().is_none());
    }

    #[test]
    fn test_last_user_message_skips_assistant_turns() {
        let req = ReasonRequest {
            messages: vec![
                Turn::user("first"),
                Turn::user("second"),
                Turn::assistant("reply"),
            ],
            goal: DEFAULT_GOAL.to_string(),
        };
        assert_eq!(req.last_user_message(), Some("second"));
    }

    #[test]
    fn test_thought_optional_fields() {
        let t: Thought = serde_json::from_value(json!({"say": "hi", "tool": null})).unwrap();
        assert_eq!(t.say, "hi");
        assert!(t.tool.is_none());
        assert!(t.args.is_none());
        assert!(t.args_or_empty().is_empty());
    }

    #[test]
    fn test_quote_item_defaults_qty() {
        let item: QuoteItemIn = serde_json::from_value(json!({"name": "Tent"})).unwrap();
        assert_eq!(item.qty, 1);
        assert!(item.id.is_none());
    }

    #[test]
    fn test_item_create_deny_unknown_fields() {
        let result: Result<ItemCreate, _> =
            serde_json::from_value(json!({"name": "Chair", "daily_price": 2.5, "color": "red"}));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unknown field"));
    }

    #[test]
    fn test_money_out_omits_missing_note() {
        let money = MoneyOut {
            line_items: vec![],
            subtotal: 0.0,
            delivery_fee: 0.0,
            labor_fee: 0.0,
            discounts: 0.0,
            tax: 0.0,
            total: 0.0,
            note: None,
        };
        let value = serde_json::to_value(&money).unwrap();
        assert!(value.get("note").is_none());
    }

    #[test]
    fn test_session_set_slot_ignores_blank() {
        let mut session = SessionState::new("call-1", "8185551234");
        session.set_slot("name", "   ");
        assert!(session.slots.is_empty());

        session.set_slot("name", "Alice");
        session.set_slot("name", "Alicia");
        assert_eq!(session.get_slot("name"), Some("Alicia"));
        assert_eq!(session.slots.len(), 1);
    }

    #[test]
    fn test_session_summary() {
        let mut session = SessionState::new("call-1", "");
        assert_eq!(session.summary(), "(no details collected yet)");

        session.set_slot("name", "Alice");
        session.set_slot("zip", "91364");
        assert_eq!(session.summary(), "Name: Alice\nZip: 91364");
        assert!(session.all_required_filled(&["name", "zip"]));
        assert!(!session.all_required_filled(&["name", "date"]));
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(BotError::MissingTenant.http_status(), 400);
        assert_eq!(
            BotError::UnknownTenant { tenant: "x".into() }.http_status(),
            404
        );
        assert_eq!(BotError::Unauthorized.http_status(), 401);
        let shape = BotError::UnknownTool { tool: "dance".into() }.to_error_shape();
        assert_eq!(shape.error_type, "BadRequest");
        assert_eq!(shape.error_message, "Unknown tool 'dance'");
    }

    #[test]
    fn test_unknown_item_request_lists_suggestions() {
        let id = uuid::Uuid::new_v4();
        let err = BotError::UnknownItemRequest {
            item: "tables".into(),
            suggestions: vec![ItemSuggestion { id, name: "Table 60\" Round".into() }],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Unknown item in request: tables"));
        assert!(msg.contains("Table 60\" Round"));
    }

    #[test]
    fn test_tenant_config_minimal_file() {
        let raw = r#"
            [business]
            name = "Special Events"
            warehouse_zip = "91367"

            [inventory]
        "#;
        let cfg = TenantConfig::from_toml_str(raw).unwrap();
        assert_eq!(cfg.pricing.weekend_multiplier, 1.0);
        assert!(cfg.dids().is_empty());
        assert!(cfg.inventory.items.is_empty());
    }

    #[test]
    fn test_default_config_binds_all_interfaces() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.tenants.header, "X-Tenant");
    }
}
