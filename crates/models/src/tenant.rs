//! On-disk layout of a tenant file (`tenants/<name>.toml`).
//!
//! Every section except `business` and `inventory` may be omitted. Numeric
//! pricing knobs default to zero, which turns the matching fee or discount off.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenantConfig {
    pub business: BusinessConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephony: Option<TelephonyConfig>,
    #[serde(default)]
    pub pricing: PricingConfig,
    pub inventory: InventoryConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog: Option<TenantDialogConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    /// Zip prefixes served, e.g. `"913*"`. The `*` is decorative.
    #[serde(default)]
    pub service_area: Vec<String>,
    pub warehouse_zip: String,
    #[serde(default)]
    pub min_order_subtotal: f64,
    #[serde(default)]
    pub tax_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TelephonyConfig {
    #[serde(default)]
    pub did: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingConfig {
    #[serde(default = "default_multiplier")]
    pub weekend_multiplier: f64,
    #[serde(default)]
    pub setup_minutes_per_item: u32,
    #[serde(default)]
    pub staff_hourly: f64,
    #[serde(default)]
    pub discounts: DiscountConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

fn default_multiplier() -> f64 {
    1.0
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            weekend_multiplier: default_multiplier(),
            setup_minutes_per_item: 0,
            staff_hourly: 0.0,
            discounts: DiscountConfig::default(),
            delivery: DeliveryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiscountConfig {
    #[serde(default)]
    pub weekday_pct: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub base_fee: f64,
    #[serde(default)]
    pub per_mile: f64,
    #[serde(default)]
    pub bands: Vec<DeliveryBand>,
}

/// Flat delivery fee for every zip starting with `prefix`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryBand {
    pub prefix: String,
    pub fee: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InventoryConfig {
    #[serde(default)]
    pub items: Vec<InventoryItem>,
    #[serde(default)]
    pub blocks: Vec<InventoryBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub daily_price: f64,
    pub qty: u32,
}

/// Units of an item already reserved on a given date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryBlock {
    pub id: Uuid,
    pub date: String,
    pub qty: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TenantDialogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_greeting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_email: Option<String>,
}

impl TenantConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn dids(&self) -> &[String] {
        self.telephony
            .as_ref()
            .map(|t| t.did.as_slice())
            .unwrap_or(&[])
    }
}
