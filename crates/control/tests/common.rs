use phonebot_control::{PricingEngine, Repo, ToolRunner};
use phonebot_models::TenantConfig;
use phonebot_testsupport::SAMPLE_TENANT_TOML;
use std::sync::Arc;

#[allow(dead_code)]
pub fn sample_engine() -> PricingEngine {
    let config = TenantConfig::from_toml_str(SAMPLE_TENANT_TOML).expect("sample tenant parses");
    PricingEngine::from_config("special-events.toml", config)
}

#[allow(dead_code)]
pub fn runner() -> (ToolRunner, Arc<Repo>) {
    let repo = Arc::new(Repo::new());
    (ToolRunner::new(repo.clone(), -8), repo)
}
