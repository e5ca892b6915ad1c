//! Turns loosely structured tool arguments (as produced by the language
//! model) into catalog ids, ZIP codes and ISO dates.

use crate::pricing::{parse_iso_date, PricingEngine};
use chrono::{Datelike, Duration, FixedOffset, NaiveDate, Utc, Weekday};
use phonebot_models::{BotError, ItemSuggestion, QuoteItemIn};
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

const MIN_FUZZY_OVERLAP: usize = 2;
const MAX_SUGGESTIONS: usize = 3;
const ZIP_KEYS: [&str; 5] = ["zip", "postal", "area", "location", "location_prefix"];

/// Lowercased word tokens with punctuation removed and a naive plural strip.
pub fn canon(s: &str) -> Vec<String> {
    let cleaned: String = s
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned
        .split_whitespace()
        .map(|t| {
            if t.chars().count() > 3 && t.ends_with('s') {
                t[..t.len() - 1].to_string()
            } else {
                t.to_string()
            }
        })
        .collect()
}

fn token_set(s: &str) -> HashSet<String> {
    canon(s).into_iter().collect()
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-empty string-ish value among `keys`.
pub fn arg_str(args: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| args.get(*k))
        .find_map(value_to_string)
}

fn parse_qty(value: Option<&Value>) -> Result<u32, BotError> {
    let invalid = |v: &Value| BotError::InvalidRequest {
        reason: format!("invalid quantity: {}", v),
    };
    match value {
        None | Some(Value::Null) => Ok(1),
        Some(v @ Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(|| invalid(v)),
        Some(v @ Value::String(s)) => s.trim().parse::<u32>().map_err(|_| invalid(v)),
        Some(v) => Err(invalid(v)),
    }
}

struct ItemRef {
    id: Option<String>,
    name: Option<String>,
    qty: u32,
}

impl ItemRef {
    fn from_value(value: &Value) -> Result<Self, BotError> {
        match value {
            Value::String(name) => Ok(Self {
                id: None,
                name: Some(name.trim().to_string()),
                qty: 1,
            }),
            Value::Object(obj) => Ok(Self {
                id: arg_str(obj, &["id"]),
                name: arg_str(obj, &["name", "item"]),
                qty: parse_qty(obj.get("qty").or_else(|| obj.get("quantity")))?,
            }),
            other => Err(BotError::InvalidRequest {
                reason: format!("unsupported item entry: {}", other),
            }),
        }
    }

    fn describe(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_else(|| "(unnamed item)".to_string())
    }
}

fn catalog_id(engine: &PricingEngine, raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim())
        .ok()
        .filter(|id| engine.item(id).is_some())
}

fn exact_name(engine: &PricingEngine, name: &str) -> Option<Uuid> {
    let wanted = name.to_lowercase();
    engine
        .catalog()
        .iter()
        .find(|i| i.name.to_lowercase() == wanted)
        .map(|i| i.id)
}

fn fuzzy_scores(engine: &PricingEngine, name: &str) -> Vec<(Uuid, String, usize)> {
    let query = token_set(name);
    engine
        .catalog()
        .iter()
        .map(|i| {
            let score = token_set(&i.name).intersection(&query).count();
            (i.id, i.name.clone(), score)
        })
        .collect()
}

fn suggestions(engine: &PricingEngine, name: &str) -> Vec<ItemSuggestion> {
    let mut scored = fuzzy_scores(engine, name);
    // stable sort keeps catalog order among equal scores
    scored.sort_by(|a, b| b.2.cmp(&a.2));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .filter(|(_, _, score)| *score > 0)
        .map(|(id, name, _)| ItemSuggestion { id, name })
        .collect()
}

fn resolve(engine: &PricingEngine, item: &ItemRef, fuzzy: bool) -> Result<Uuid, BotError> {
    if let Some(id) = item.id.as_deref().and_then(|raw| catalog_id(engine, raw)) {
        return Ok(id);
    }

    if let Some(name) = item.name.as_deref().filter(|n| !n.is_empty()) {
        if let Some(id) = exact_name(engine, name) {
            return Ok(id);
        }
        if fuzzy {
            let mut best: Option<(Uuid, usize)> = None;
            for (id, _, score) in fuzzy_scores(engine, name) {
                if score > best.map_or(0, |(_, s)| s) {
                    best = Some((id, score));
                }
            }
            if let Some((id, score)) = best {
                if score >= MIN_FUZZY_OVERLAP {
                    return Ok(id);
                }
            }
        }
        if let Some(id) = catalog_id(engine, name) {
            return Ok(id);
        }
        return Err(BotError::UnknownItemRequest {
            item: item.describe(),
            suggestions: suggestions(engine, name),
        });
    }

    // tool calls report every unresolved entry as a bad request
    match item.id.as_deref().and_then(|raw| Uuid::parse_str(raw).ok()) {
        Some(id) if !fuzzy => Err(BotError::UnknownItem { id }),
        _ => Err(BotError::UnknownItemRequest {
            item: item.describe(),
            suggestions: Vec::new(),
        }),
    }
}

/// Resolves the items of a tool call. Accepts `{"items": [...]}` or a single
/// `{"item": ..., "qty"|"quantity": n}`; anything else yields no items.
pub fn normalize_items(
    engine: &PricingEngine,
    args: &Map<String, Value>,
) -> Result<Vec<(Uuid, u32)>, BotError> {
    let entries: Vec<ItemRef> = match (args.get("items"), args.get("item")) {
        (Some(Value::Array(items)), _) => items
            .iter()
            .map(ItemRef::from_value)
            .collect::<Result<_, _>>()?,
        (_, Some(item)) if !item.is_null() => {
            let mut single = ItemRef::from_value(item)?;
            if args.contains_key("qty") || args.contains_key("quantity") {
                single.qty = parse_qty(args.get("quantity").or_else(|| args.get("qty")))?;
            }
            vec![single]
        }
        _ => return Ok(Vec::new()),
    };

    entries
        .iter()
        .map(|item| resolve(engine, item, true).map(|id| (id, item.qty)))
        .collect()
}

/// Strict resolution for typed requests: catalog id or exact name only.
pub fn resolve_quote_items(
    engine: &PricingEngine,
    items: &[QuoteItemIn],
) -> Result<Vec<(Uuid, u32)>, BotError> {
    items
        .iter()
        .map(|it| {
            if let Some(id) = it.id {
                return engine
                    .item(&id)
                    .map(|_| (id, it.qty))
                    .ok_or(BotError::UnknownItem { id });
            }
            let item = ItemRef {
                id: None,
                name: it.name.clone(),
                qty: it.qty,
            };
            resolve(engine, &item, false).map(|id| (id, it.qty))
        })
        .collect()
}

/// First ZIP-like argument reduced to its first five digits.
pub fn normalize_zip(args: &Map<String, Value>) -> Option<String> {
    let raw = arg_str(args, &ZIP_KEYS)?;
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(5).collect();
    if digits.is_empty() {
        Some(raw)
    } else {
        Some(digits)
    }
}

/// Resolves `"next friday"` against `today`, keeps ISO dates, and otherwise
/// returns the lower-cased input.
pub fn normalize_date(raw: &str, today: NaiveDate) -> String {
    let s = raw.trim().to_lowercase();
    if let Some(day) = s.strip_prefix("next ") {
        if let Ok(weekday) = day.trim().parse::<Weekday>() {
            let ahead = (7 + i64::from(weekday.num_days_from_monday())
                - i64::from(today.weekday().num_days_from_monday()))
                % 7;
            let ahead = if ahead == 0 { 7 } else { ahead };
            return (today + Duration::days(ahead)).format("%Y-%m-%d").to_string();
        }
    }
    match parse_iso_date(&s) {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => s,
    }
}

/// The current date at the businesses' configured UTC offset.
pub fn business_today(utc_offset_hours: i32) -> NaiveDate {
    match FixedOffset::east_opt(utc_offset_hours * 3600) {
        Some(offset) => Utc::now().with_timezone(&offset).date_naive(),
        None => Utc::now().date_naive(),
    }
}
