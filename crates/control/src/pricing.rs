use chrono::{Datelike, NaiveDate, Weekday};
use phonebot_models::{
    BotError, InventoryItem, ItemDef, LineItem, MoneyOut, Shortage, TenantConfig,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Catalog, reservations and pricing rules of one tenant, backed by its file.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    settings_path: PathBuf,
    config: TenantConfig,
    /// The file as read, so keys outside `TenantConfig` survive a save.
    document: toml::Table,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parses `YYYY-MM-DD`, also accepting an ISO datetime whose date part is used.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, BotError> {
    let trimmed = raw.trim();
    let date_part = match trimmed.get(..10) {
        Some(head) if trimmed.len() > 10 && matches!(trimmed.as_bytes()[10], b'T' | b't' | b' ') => head,
        _ => trimmed,
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| BotError::InvalidDate {
        date: raw.to_string(),
    })
}

/// Copies entries of `original` missing from `target`, descending into tables.
fn keep_unmodeled(target: &mut toml::Table, original: &toml::Table) {
    for (key, value) in original {
        match (target.get_mut(key), value) {
            (Some(toml::Value::Table(inner)), toml::Value::Table(was)) => keep_unmodeled(inner, was),
            (Some(_), _) => {}
            (None, _) => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

impl PricingEngine {
    pub async fn load(settings_path: impl AsRef<Path>) -> Result<Self, BotError> {
        let settings_path = settings_path.as_ref().to_path_buf();
        let raw = tokio::fs::read_to_string(&settings_path).await?;
        let config_error = |reason: String| BotError::TenantConfig {
            path: settings_path.display().to_string(),
            reason,
        };
        let config = TenantConfig::from_toml_str(&raw).map_err(|e| config_error(e.to_string()))?;
        let document = raw
            .parse::<toml::Table>()
            .map_err(|e| config_error(e.to_string()))?;
        info!(
            path = %settings_path.display(),
            items = config.inventory.items.len(),
            "Loaded tenant pricing"
        );
        Ok(Self {
            settings_path,
            config,
            document,
        })
    }

    pub fn from_config(settings_path: impl Into<PathBuf>, config: TenantConfig) -> Self {
        Self {
            settings_path: settings_path.into(),
            config,
            document: toml::Table::new(),
        }
    }

    pub fn config(&self) -> &TenantConfig {
        &self.config
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn catalog(&self) -> &[InventoryItem] {
        &self.config.inventory.items
    }

    pub fn item(&self, id: &Uuid) -> Option<&InventoryItem> {
        self.catalog().iter().find(|i| &i.id == id)
    }

    fn item_or_err(&self, id: &Uuid) -> Result<&InventoryItem, BotError> {
        self.item(id).ok_or(BotError::UnknownItem { id: *id })
    }

    /// Writes the tenant file back, replacing it atomically. Keys the model
    /// does not know about are carried over from the file as loaded.
    #[instrument(skip(self), fields(path = %self.settings_path.display()))]
    pub async fn save(&self) -> Result<(), BotError> {
        let internal = |reason: String| BotError::Internal { reason };
        let mut table = match toml::Value::try_from(&self.config) {
            Ok(toml::Value::Table(table)) => table,
            Ok(other) => return Err(internal(format!("tenant config is a {}", other.type_str()))),
            Err(e) => return Err(internal(e.to_string())),
        };
        keep_unmodeled(&mut table, &self.document);
        let body = toml::to_string_pretty(&table).map_err(|e| internal(e.to_string()))?;
        let tmp = self.settings_path.with_extension("toml.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.settings_path).await?;
        debug!("Tenant file saved");
        Ok(())
    }

    // CRUD

    pub fn list_items(&self) -> Vec<ItemDef> {
        self.catalog()
            .iter()
            .map(|i| ItemDef {
                id: i.id,
                name: i.name.clone(),
                daily_price: i.daily_price,
                qty: i.qty,
            })
            .collect()
    }

    pub fn add_item(&mut self, name: &str, daily_price: f64, qty: u32) -> Uuid {
        let id = Uuid::new_v4();
        self.config.inventory.items.push(InventoryItem {
            id,
            name: name.to_string(),
            daily_price,
            qty,
        });
        id
    }

    pub fn update_item(
        &mut self,
        id: &Uuid,
        name: Option<&str>,
        daily_price: Option<f64>,
        qty: Option<u32>,
    ) -> Result<ItemDef, BotError> {
        let item = self
            .config
            .inventory
            .items
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or(BotError::UnknownItem { id: *id })?;
        if let Some(name) = name {
            item.name = name.to_string();
        }
        if let Some(price) = daily_price {
            item.daily_price = price;
        }
        if let Some(qty) = qty {
            item.qty = qty;
        }
        Ok(ItemDef {
            id: item.id,
            name: item.name.clone(),
            daily_price: item.daily_price,
            qty: item.qty,
        })
    }

    pub fn delete_item(&mut self, id: &Uuid) -> Result<(), BotError> {
        let items = &mut self.config.inventory.items;
        let before = items.len();
        items.retain(|i| &i.id != id);
        if items.len() == before {
            return Err(BotError::UnknownItem { id: *id });
        }
        Ok(())
    }

    // helpers

    pub fn is_weekend(date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn service_in_area(&self, zip: &str) -> bool {
        self.config
            .business
            .service_area
            .iter()
            .any(|p| zip.starts_with(&p.replace('*', "")))
    }

    pub fn estimate_miles(&self, customer_zip: &str) -> f64 {
        let a = customer_zip.get(..3).unwrap_or(customer_zip);
        let warehouse = &self.config.business.warehouse_zip;
        let b = warehouse.get(..3).unwrap_or(warehouse);
        if a == b {
            return 5.0;
        }
        match (a.parse::<i64>(), b.parse::<i64>()) {
            (Ok(x), Ok(y)) if (x - y).abs() <= 1 => 10.0,
            _ => 20.0,
        }
    }

    // availability

    /// Items whose stock, minus same-day blocks, can't cover the request.
    /// `date` is read like `price` reads it, so a datetime matches its day.
    pub fn check_availability(
        &self,
        date: &str,
        requested: &[(Uuid, u32)],
    ) -> Result<Vec<Shortage>, BotError> {
        let day = parse_iso_date(date)?;
        let mut reserved: HashMap<Uuid, i64> = HashMap::new();
        for block in self
            .config
            .inventory
            .blocks
            .iter()
            .filter(|b| parse_iso_date(&b.date).ok() == Some(day))
        {
            *reserved.entry(block.id).or_insert(0) += i64::from(block.qty);
        }

        let mut shortages = Vec::new();
        for (id, qty) in requested {
            let item = self.item_or_err(id)?;
            let have = i64::from(item.qty) - reserved.get(id).copied().unwrap_or(0);
            if i64::from(*qty) > have {
                shortages.push(Shortage {
                    id: *id,
                    requested: *qty,
                    available: have,
                });
            }
        }
        Ok(shortages)
    }

    // pricing

    #[instrument(skip(self, requested))]
    pub fn price(
        &self,
        date: &str,
        zip: &str,
        requested: &[(Uuid, u32)],
    ) -> Result<MoneyOut, BotError> {
        if !self.service_in_area(zip) {
            return Err(BotError::OutsideServiceArea { zip: zip.to_string() });
        }
        let day = parse_iso_date(date)?;
        let business = &self.config.business;
        let pricing = &self.config.pricing;

        let mut line_items = Vec::with_capacity(requested.len());
        let mut subtotal = 0.0;
        for (id, qty) in requested {
            let item = self.item_or_err(id)?;
            let line = item.daily_price * f64::from(*qty);
            line_items.push(LineItem {
                id: item.id,
                name: item.name.clone(),
                qty: *qty,
                unit: item.daily_price,
                line: round2(line),
            });
            subtotal += line;
        }

        if Self::is_weekend(day) {
            subtotal *= pricing.weekend_multiplier;
        }

        let mut discounts = 0.0;
        if subtotal >= business.min_order_subtotal
            && day.weekday().num_days_from_monday() <= 3
        {
            discounts = round2(subtotal * pricing.discounts.weekday_pct);
        }

        let total_qty: f64 = requested.iter().map(|(_, q)| f64::from(*q)).sum();
        let setup_minutes = f64::from(pricing.setup_minutes_per_item) * total_qty;
        let labor_fee = round2(setup_minutes / 60.0 * pricing.staff_hourly);

        let delivery_fee = match pricing
            .delivery
            .bands
            .iter()
            .find(|band| zip.starts_with(&band.prefix))
        {
            Some(band) => band.fee,
            None => round2(
                pricing.delivery.base_fee + pricing.delivery.per_mile * self.estimate_miles(zip),
            ),
        };

        let taxable = (subtotal - discounts).max(0.0) + labor_fee;
        let tax = round2(taxable * business.tax_rate);
        let total = round2(taxable + delivery_fee + tax);

        Ok(MoneyOut {
            line_items,
            subtotal: round2(subtotal),
            delivery_fee,
            labor_fee,
            discounts,
            tax,
            total,
            note: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235001), 1.24);
        assert_eq!(round2(-0.0), 0.0);
    }

    #[test]
    fn test_parse_iso_date_accepts_datetime() {
        let d = parse_iso_date("2025-05-15T10:30:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 5, 15).unwrap());
        assert!(parse_iso_date("2025-5-15x").is_err());
        assert!(matches!(
            parse_iso_date("next saturday, the 11th"),
            Err(BotError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_weekend_detection() {
        let saturday = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();
        let thursday = NaiveDate::from_ymd_opt(2025, 5, 15).unwrap();
        assert!(PricingEngine::is_weekend(saturday));
        assert!(!PricingEngine::is_weekend(thursday));
    }
}
