use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

pub const TENANT: &str = "special-events";
pub const TENANT_DID: &str = "+18185550100";
pub const NOTIFICATIONS_EMAIL: &str = "owner@special-events.test";

pub const CHAIR_ID: Uuid = Uuid::from_u128(0x11111111_1111_4111_8111_111111111111);
pub const TABLE_ID: Uuid = Uuid::from_u128(0x22222222_2222_4222_8222_222222222222);
pub const TENT_ID: Uuid = Uuid::from_u128(0x33333333_3333_4333_8333_333333333333);

/// A Thursday with 150 of the 200 chairs already blocked.
pub const BUSY_THURSDAY: &str = "2025-05-15";
/// A Saturday with every tent blocked.
pub const TENTLESS_SATURDAY: &str = "2025-05-17";
/// A Wednesday with nothing blocked.
pub const QUIET_WEDNESDAY: &str = "2025-05-14";

pub const SAMPLE_TENANT_TOML: &str = r#"
[business]
name = "Special Events Rentals"
slug = "special-events"
hours = "Mon-Sat 9am-6pm"
service_area = ["913*", "914*"]
warehouse_zip = "91367"
min_order_subtotal = 100.0
tax_rate = 0.095

[telephony]
did = ["+18185550100"]

[pricing]
weekend_multiplier = 1.2
setup_minutes_per_item = 2
staff_hourly = 30.0

[pricing.discounts]
weekday_pct = 0.1

[pricing.delivery]
base_fee = 50.0
per_mile = 2.0

[[pricing.delivery.bands]]
prefix = "91367"
fee = 40.0

[[inventory.items]]
id = "11111111-1111-4111-8111-111111111111"
name = "Resin Folding Chair (White)"
daily_price = 3.5
qty = 200

[[inventory.items]]
id = "22222222-2222-4222-8222-222222222222"
name = 'Table 60" Round'
daily_price = 12.0
qty = 20

[[inventory.items]]
id = "33333333-3333-4333-8333-333333333333"
name = "Tent 20x20"
daily_price = 250.0
qty = 2

[[inventory.blocks]]
id = "11111111-1111-4111-8111-111111111111"
date = "2025-05-15"
qty = 150

[[inventory.blocks]]
id = "33333333-3333-4333-8333-333333333333"
date = "2025-05-17"
qty = 2

[dialog]
notifications_email = "owner@special-events.test"
"#;

/// Temporary tenants directory, removed on drop.
pub struct TenantDir {
    dir: TempDir,
}

impl TenantDir {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn tenant_file(&self, name: &str) -> PathBuf {
        self.dir.path().join(format!("{}.toml", name))
    }

    pub fn write_tenant(&self, name: &str, body: &str) -> Result<PathBuf> {
        let path = self.tenant_file(name);
        std::fs::write(&path, body)?;
        Ok(path)
    }

    pub fn read_tenant(&self, name: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.tenant_file(name))?)
    }
}

/// Empty tenants directory.
pub fn empty_tenant_dir() -> Result<TenantDir> {
    Ok(TenantDir {
        dir: tempfile::tempdir()?,
    })
}

/// Tenants directory holding the `special-events` sample tenant.
pub fn sample_tenant_dir() -> Result<TenantDir> {
    let dir = empty_tenant_dir()?;
    dir.write_tenant(TENANT, SAMPLE_TENANT_TOML)?;
    Ok(dir)
}
