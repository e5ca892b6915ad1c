use std::sync::Arc;
use axum::http::HeaderMap;
use phonebot_control::{Agent, Repo, SessionStore, SharedEngine, TenantManager, TenantWorkflow, ToolRunner};
use phonebot_llm::{Reasoner, SlotExtractor, SpeechSynthesizer};
use phonebot_metrics::MetricsService;
use phonebot_models::{BotError, Config, TenantConfig};
use phonebot_notify::Notifier;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";
pub const CALLER_NUMBER_HEADER: &str = "X-Caller-Number";

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tenants: Arc<TenantManager>,
    pub repo: Arc<Repo>,
    pub sessions: Arc<SessionStore>,
    pub agent: Agent,
    pub slot_extractor: Arc<dyn SlotExtractor>,
    pub notifier: Arc<dyn Notifier>,
    pub speech: Option<Arc<SpeechSynthesizer>>,
    pub metrics: Arc<MetricsService>,
}

/// A resolved tenant: its key and shared engine.
pub struct TenantHandle {
    pub name: String,
    pub engine: SharedEngine,
}

impl AppState {
    pub fn new(
        config: Config,
        reasoner: Arc<dyn Reasoner>,
        slot_extractor: Arc<dyn SlotExtractor>,
        notifier: Arc<dyn Notifier>,
        speech: Option<Arc<SpeechSynthesizer>>,
        metrics: Arc<MetricsService>,
    ) -> Self {
        let tenants = Arc::new(TenantManager::new(&config.tenants.dir));
        let repo = Arc::new(Repo::new());
        let runner = ToolRunner::new(repo.clone(), config.dialog.utc_offset_hours);
        Self {
            agent: Agent::new(reasoner, runner),
            config,
            tenants,
            repo,
            sessions: Arc::new(SessionStore::new()),
            slot_extractor,
            notifier,
            speech,
            metrics,
        }
    }

    pub async fn resolve_tenant(&self, headers: &HeaderMap) -> Result<TenantHandle, BotError> {
        let name = self
            .tenants
            .resolve_tenant_name(
                |h| headers.get(h).and_then(|v| v.to_str().ok()),
                &self.config.tenants.header,
                self.config.tenants.from_did,
            )
            .ok_or(BotError::MissingTenant)?;
        let engine = self.tenants.get_engine(&name).await?;
        Ok(TenantHandle { name, engine })
    }

    /// An unset admin key disables the admin endpoints.
    pub fn check_admin(&self, headers: &HeaderMap) -> Result<(), BotError> {
        let expected = self.config.admin.api_key.as_str();
        let given = headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if expected.is_empty() || given != expected {
            return Err(BotError::Unauthorized);
        }
        Ok(())
    }

    pub fn business_name(&self, tenant: &TenantConfig) -> String {
        let name = tenant.business.name.trim();
        if name.is_empty() {
            self.config.dialog.tenant_name.clone()
        } else {
            name.to_string()
        }
    }

    pub fn opening_greeting(&self, tenant: &TenantConfig) -> String {
        tenant
            .dialog
            .as_ref()
            .and_then(|d| d.opening_greeting.clone())
            .unwrap_or_else(|| self.config.dialog.opening_greeting.clone())
    }

    pub fn notifications_email(&self, tenant: &TenantConfig) -> String {
        tenant
            .dialog
            .as_ref()
            .and_then(|d| d.notifications_email.clone())
            .unwrap_or_else(|| self.config.dialog.notifications_email.clone())
    }

    pub fn workflow_for(&self, tenant: &TenantConfig) -> TenantWorkflow {
        TenantWorkflow::new(
            self.business_name(tenant),
            self.notifications_email(tenant),
            self.slot_extractor.clone(),
            self.notifier.clone(),
        )
    }
}

pub fn caller_number(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CALLER_NUMBER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
