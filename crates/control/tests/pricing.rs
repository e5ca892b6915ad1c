mod common;

use common::sample_engine;
use phonebot_control::PricingEngine;
use phonebot_models::BotError;
use phonebot_testsupport::{
    BUSY_THURSDAY, CHAIR_ID, QUIET_WEDNESDAY, TABLE_ID, TENTLESS_SATURDAY, TENT_ID,
};

#[test]
fn weekday_quote_applies_discount_labor_band_and_tax() {
    let engine = sample_engine();
    let money = engine
        .price(QUIET_WEDNESDAY, "91367", &[(CHAIR_ID, 50), (TABLE_ID, 5)])
        .unwrap();

    assert_eq!(money.line_items.len(), 2);
    assert_eq!(money.line_items[0].line, 175.0);
    assert_eq!(money.line_items[1].line, 60.0);
    assert_eq!(money.subtotal, 235.0);
    assert_eq!(money.discounts, 23.5);
    // 55 items * 2 minutes at $30/h
    assert_eq!(money.labor_fee, 55.0);
    assert_eq!(money.delivery_fee, 40.0);
    assert_eq!(money.tax, 25.32);
    assert_eq!(money.total, 331.82);
    assert!(money.note.is_none());
}

#[test]
fn weekend_quote_uses_multiplier_and_mileage() {
    let engine = sample_engine();
    let money = engine
        .price(TENTLESS_SATURDAY, "91401", &[(CHAIR_ID, 10)])
        .unwrap();

    assert_eq!(money.subtotal, 42.0);
    assert_eq!(money.discounts, 0.0);
    assert_eq!(money.labor_fee, 10.0);
    // neighbouring prefix: 10 miles at $2 on top of the $50 base
    assert_eq!(money.delivery_fee, 70.0);
    assert_eq!(money.tax, 4.94);
    assert_eq!(money.total, 126.94);
}

#[test]
fn friday_gets_no_weekday_discount() {
    let engine = sample_engine();
    let money = engine.price("2025-05-16", "91367", &[(TABLE_ID, 10)]).unwrap();
    assert_eq!(money.subtotal, 120.0);
    assert_eq!(money.discounts, 0.0);
}

#[test]
fn small_weekday_order_gets_no_discount() {
    let engine = sample_engine();
    let money = engine.price(QUIET_WEDNESDAY, "91367", &[(CHAIR_ID, 10)]).unwrap();
    assert_eq!(money.subtotal, 35.0);
    assert_eq!(money.discounts, 0.0);
}

#[test]
fn outside_service_area_is_rejected() {
    let engine = sample_engine();
    let err = engine.price(QUIET_WEDNESDAY, "90210", &[(CHAIR_ID, 1)]).unwrap_err();
    assert!(matches!(err, BotError::OutsideServiceArea { .. }));
    assert_eq!(err.http_status(), 400);
}

#[test]
fn unparseable_date_is_rejected_when_pricing() {
    let engine = sample_engine();
    let err = engine.price("the weekend", "91367", &[(CHAIR_ID, 1)]).unwrap_err();
    assert!(matches!(err, BotError::InvalidDate { .. }));
}

#[test]
fn mileage_estimate_by_prefix_distance() {
    let engine = sample_engine();
    assert_eq!(engine.estimate_miles("91367"), 5.0);
    assert_eq!(engine.estimate_miles("91401"), 10.0);
    assert_eq!(engine.estimate_miles("93101"), 20.0);
    assert_eq!(engine.estimate_miles("AB"), 20.0);
}

#[test]
fn availability_subtracts_same_day_blocks_only() {
    let engine = sample_engine();

    let short = engine.check_availability(BUSY_THURSDAY, &[(CHAIR_ID, 60)]).unwrap();
    assert_eq!(short.len(), 1);
    assert_eq!(short[0].id, CHAIR_ID);
    assert_eq!(short[0].requested, 60);
    assert_eq!(short[0].available, 50);

    let fine = engine.check_availability(QUIET_WEDNESDAY, &[(CHAIR_ID, 60)]).unwrap();
    assert!(fine.is_empty());

    let tents = engine.check_availability(TENTLESS_SATURDAY, &[(TENT_ID, 1)]).unwrap();
    assert_eq!(tents[0].available, 0);
}

#[test]
fn unknown_item_id_is_not_found() {
    let engine = sample_engine();
    let missing = uuid::Uuid::new_v4();
    let err = engine.check_availability(QUIET_WEDNESDAY, &[(missing, 1)]).unwrap_err();
    assert_eq!(err.http_status(), 404);
}

#[test]
fn inventory_crud_in_memory() {
    let mut engine = sample_engine();
    let id = engine.add_item("Heater", 45.0, 4);
    assert_eq!(engine.list_items().len(), 4);

    let updated = engine.update_item(&id, None, Some(50.0), None).unwrap();
    assert_eq!(updated.name, "Heater");
    assert_eq!(updated.daily_price, 50.0);
    assert_eq!(updated.qty, 4);

    engine.delete_item(&id).unwrap();
    assert!(engine.item(&id).is_none());
    assert!(matches!(
        engine.delete_item(&id),
        Err(BotError::UnknownItem { .. })
    ));
}

#[tokio::test]
async fn save_persists_catalog_changes() {
    let dir = phonebot_testsupport::sample_tenant_dir().unwrap();
    let path = dir.tenant_file(phonebot_testsupport::TENANT);

    let mut engine = PricingEngine::load(&path).await.unwrap();
    let id = engine.add_item("Dance Floor 12x12", 300.0, 1);
    engine.save().await.unwrap();

    let reloaded = PricingEngine::load(&path).await.unwrap();
    let item = reloaded.item(&id).expect("new item persisted");
    assert_eq!(item.name, "Dance Floor 12x12");
    // untouched sections survive the rewrite
    assert_eq!(reloaded.config().business.tax_rate, 0.095);
    assert_eq!(reloaded.config().inventory.blocks.len(), 2);
    assert_eq!(reloaded.config().dids(), vec!["+18185550100"]);
}

#[tokio::test]
async fn save_keeps_keys_outside_the_model() {
    let dir = phonebot_testsupport::sample_tenant_dir().unwrap();
    let raw = phonebot_testsupport::SAMPLE_TENANT_TOML.replacen(
        "[business]\n",
        "[business]\naddress = \"123 Main St\"\n",
        1,
    ) + "\n[crm]\npipeline = \"events\"\n";
    let path = dir.write_tenant("annotated", &raw).unwrap();

    let mut engine = PricingEngine::load(&path).await.unwrap();
    engine.add_item("Heater", 45.0, 4);
    engine.save().await.unwrap();

    let saved: toml::Table = dir.read_tenant("annotated").unwrap().parse().unwrap();
    assert_eq!(saved["business"]["address"].as_str(), Some("123 Main St"));
    assert_eq!(saved["crm"]["pipeline"].as_str(), Some("events"));
    assert_eq!(saved["inventory"]["items"].as_array().map(Vec::len), Some(4));
}

#[test]
fn availability_reads_datetimes_like_pricing() {
    let engine = sample_engine();
    let datetime = format!("{}T10:00:00", BUSY_THURSDAY);

    let short = engine.check_availability(&datetime, &[(CHAIR_ID, 60)]).unwrap();
    assert_eq!(short.len(), 1);
    assert_eq!(short[0].available, 50);
    assert!(engine.price(&datetime, "91367", &[(CHAIR_ID, 60)]).is_ok());

    assert!(matches!(
        engine.check_availability("sometime soon", &[(CHAIR_ID, 1)]),
        Err(BotError::InvalidDate { .. })
    ));
}

#[test]
fn huge_quantities_do_not_overflow_labor() {
    let engine = sample_engine();
    let money = engine
        .price(QUIET_WEDNESDAY, "91367", &[(CHAIR_ID, u32::MAX), (TABLE_ID, 2)])
        .unwrap();

    // (u32::MAX + 2) items * 2 minutes at $30/h
    let expected = (f64::from(u32::MAX) + 2.0) * 2.0 / 60.0 * 30.0;
    assert!((money.labor_fee - expected).abs() < 1.0);
    assert!(money.total > money.labor_fee);
}
