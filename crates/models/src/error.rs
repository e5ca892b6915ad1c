use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorShape {
    pub error_message: String,
    pub error_type: String,
}

/// Catalog entry offered back to the caller when an item name can't be resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemSuggestion {
    pub id: Uuid,
    pub name: String,
}

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Missing tenant. Provide X-Tenant header or X-Caller-DID.")]
    MissingTenant,

    #[error("Unknown tenant '{tenant}'. Add tenants/{tenant}.toml")]
    UnknownTenant { tenant: String },

    #[error("Unknown item id: {id}")]
    UnknownItem { id: Uuid },

    #[error("Unknown item in request: {item}. Suggestions: {}", format_suggestions(.suggestions))]
    UnknownItemRequest {
        item: String,
        suggestions: Vec<ItemSuggestion>,
    },

    #[error("Invalid date: {date}")]
    InvalidDate { date: String },

    #[error("Address outside service area")]
    OutsideServiceArea { zip: String },

    #[error("Unknown tool '{tool}'")]
    UnknownTool { tool: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Admin key required")]
    Unauthorized,

    #[error("{reason}")]
    Reasoning { reason: String },

    #[error("Tenant configuration error in {path}: {reason}")]
    TenantConfig { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {reason}")]
    Internal { reason: String },
}

fn format_suggestions(suggestions: &[ItemSuggestion]) -> String {
    let names: Vec<String> = suggestions
        .iter()
        .map(|s| format!("{} ({})", s.name, s.id))
        .collect();
    format!("[{}]", names.join(", "))
}

impl BotError {
    pub fn to_error_shape(&self) -> ErrorShape {
        ErrorShape {
            error_message: self.to_string(),
            error_type: self.error_type().to_string(),
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            BotError::MissingTenant => "BadRequest",
            BotError::UnknownTenant { .. } => "NotFound",
            BotError::UnknownItem { .. } => "NotFound",
            BotError::UnknownItemRequest { .. } => "BadRequest",
            BotError::InvalidDate { .. } => "BadRequest",
            BotError::OutsideServiceArea { .. } => "BadRequest",
            BotError::UnknownTool { .. } => "BadRequest",
            BotError::InvalidRequest { .. } => "BadRequest",
            BotError::Unauthorized => "Unauthorized",
            BotError::Reasoning { .. } => "ReasonError",
            BotError::TenantConfig { .. } => "ServiceException",
            BotError::Io(_) => "ServiceException",
            BotError::Internal { .. } => "ServiceException",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            BotError::MissingTenant => 400,
            BotError::UnknownTenant { .. } => 404,
            BotError::UnknownItem { .. } => 404,
            BotError::UnknownItemRequest { .. } => 400,
            BotError::InvalidDate { .. } => 400,
            BotError::OutsideServiceArea { .. } => 400,
            BotError::UnknownTool { .. } => 400,
            BotError::InvalidRequest { .. } => 400,
            BotError::Unauthorized => 401,
            BotError::Reasoning { .. } => 500,
            BotError::TenantConfig { .. } => 500,
            BotError::Io(_) => 500,
            BotError::Internal { .. } => 500,
        }
    }
}
