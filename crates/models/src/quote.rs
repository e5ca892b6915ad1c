use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An item requested by id or by its catalog name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteItemIn {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_qty")]
    pub qty: u32,
}

fn default_qty() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteIn {
    pub date: String,
    pub zip: String,
    pub items: Vec<QuoteItemIn>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityIn {
    pub date: String,
    pub items: Vec<QuoteItemIn>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub id: Uuid,
    pub name: String,
    pub qty: u32,
    pub unit: f64,
    pub line: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoneyOut {
    pub line_items: Vec<LineItem>,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub labor_fee: f64,
    pub discounts: f64,
    pub tax: f64,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shortage {
    pub id: Uuid,
    pub requested: u32,
    /// Negative when blocks already exceed the stock.
    pub available: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityOut {
    pub available: bool,
    #[serde(default)]
    pub shortages: Vec<Shortage>,
    #[serde(default)]
    pub substitutions: Vec<serde_json::Value>,
}

impl AvailabilityOut {
    pub fn from_shortages(shortages: Vec<Shortage>) -> Self {
        Self {
            available: shortages.is_empty(),
            shortages,
            substitutions: Vec::new(),
        }
    }
}

pub const SHORTAGE_NOTE: &str = "Some items are short; consider substitutions.";
