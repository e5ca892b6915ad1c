use crate::normalize::{arg_str, business_today, normalize_date, normalize_items, normalize_zip};
use crate::pricing::PricingEngine;
use crate::repo::Repo;
use phonebot_models::{AvailabilityOut, BotError, SHORTAGE_NOTE};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};

/// Tools the reasoning step may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    CheckAvailability,
    Quote,
    CreateLead,
    Book,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Quote, Tool::CheckAvailability, Tool::CreateLead, Tool::Book];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::CheckAvailability => "check_availability",
            Tool::Quote => "quote",
            Tool::CreateLead => "create_lead",
            Tool::Book => "book",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Tool::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| BotError::UnknownTool {
                tool: name.to_string(),
            })
    }
}

/// Executes tool calls against a tenant's engine and the shared repository.
#[derive(Clone)]
pub struct ToolRunner {
    repo: Arc<Repo>,
    utc_offset_hours: i32,
}

impl ToolRunner {
    pub fn new(repo: Arc<Repo>, utc_offset_hours: i32) -> Self {
        Self {
            repo,
            utc_offset_hours,
        }
    }

    pub fn repo(&self) -> &Arc<Repo> {
        &self.repo
    }

    fn event_date(&self, args: &Map<String, Value>) -> Option<String> {
        let raw = arg_str(args, &["date", "delivery_date"])?;
        Some(normalize_date(&raw, business_today(self.utc_offset_hours)))
    }

    /// Runs `tool`; an empty name is a no-op returning `{}`.
    #[instrument(skip(self, engine, args))]
    pub fn run(
        &self,
        engine: &PricingEngine,
        tool: &str,
        args: &Map<String, Value>,
    ) -> Result<Value, BotError> {
        if tool.trim().is_empty() {
            return Ok(json!({}));
        }
        let parsed: Tool = tool.parse()?;
        info!(tool = %parsed, "Running tool");

        match parsed {
            Tool::CheckAvailability => {
                let date = self.event_date(args).ok_or_else(|| BotError::InvalidRequest {
                    reason: "check_availability requires 'date'".to_string(),
                })?;
                let items = normalize_items(engine, args)?;
                let shortages = engine.check_availability(&date, &items)?;
                to_value(AvailabilityOut::from_shortages(shortages))
            }
            Tool::Quote => {
                let (date, zip) = match (self.event_date(args), normalize_zip(args)) {
                    (Some(d), Some(z)) => (d, z),
                    _ => {
                        return Err(BotError::InvalidRequest {
                            reason: "quote requires 'date' and a ZIP".to_string(),
                        })
                    }
                };
                let items = normalize_items(engine, args)?;
                let shortages = engine.check_availability(&date, &items)?;
                let mut priced = engine.price(&date, &zip, &items)?;
                if !shortages.is_empty() {
                    priced.note = Some(SHORTAGE_NOTE.to_string());
                }
                to_value(priced)
            }
            Tool::CreateLead => {
                let name = arg_str(args, &["name"]).unwrap_or_else(|| "Caller".to_string());
                let phone = arg_str(args, &["phone", "caller"]).unwrap_or_default();
                let lead = self.repo.create_lead(
                    &name,
                    &phone,
                    arg_str(args, &["email"]),
                    arg_str(args, &["quote_id"]),
                );
                Ok(json!({ "lead_id": lead.lead_id }))
            }
            Tool::Book => {
                let quote_id = arg_str(args, &["quote_id"]).unwrap_or_default();
                let token = arg_str(args, &["payment_token"]).unwrap_or_else(|| "demo".to_string());
                let order = self.repo.create_order(&quote_id);
                Ok(json!({ "order_id": order.order_id, "payment_token_used": token }))
            }
        }
    }
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, BotError> {
    serde_json::to_value(value).map_err(|e| BotError::Internal {
        reason: e.to_string(),
    })
}
