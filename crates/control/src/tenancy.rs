use crate::pricing::PricingEngine;
use dashmap::DashMap;
use phonebot_models::{BotError, TenantConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

pub type SharedEngine = Arc<RwLock<PricingEngine>>;

const TENANT_EXT: &str = "toml";

/// Headers a telephony provider uses to pass the dialed number.
pub const DID_HEADERS: [&str; 2] = ["X-Caller-DID", "X-Twilio-Called"];

/// Loads tenant files on demand and keeps one engine per tenant for the
/// process lifetime.
pub struct TenantManager {
    tenants_dir: PathBuf,
    cache: DashMap<String, SharedEngine>,
    did_map: HashMap<String, String>,
}

impl TenantManager {
    pub fn new(tenants_dir: impl Into<PathBuf>) -> Self {
        let tenants_dir = tenants_dir.into();
        let did_map = load_did_map(&tenants_dir);
        info!(
            dir = %tenants_dir.display(),
            dids = did_map.len(),
            "Tenant manager initialized"
        );
        Self {
            tenants_dir,
            cache: DashMap::new(),
            did_map,
        }
    }

    pub fn tenants_dir(&self) -> &Path {
        &self.tenants_dir
    }

    pub fn list_tenants(&self) -> Vec<String> {
        let mut names: Vec<String> = tenant_files(&self.tenants_dir)
            .into_iter()
            .filter_map(|p| tenant_key(&p))
            .collect();
        names.sort();
        names
    }

    pub fn tenant_for_did(&self, did: &str) -> Option<&str> {
        self.did_map.get(&normalize_did(did)).map(String::as_str)
    }

    pub fn path_for(&self, tenant: &str) -> Result<PathBuf, BotError> {
        let unknown = || BotError::UnknownTenant {
            tenant: tenant.to_string(),
        };
        if tenant.is_empty()
            || tenant.contains(['/', '\\'])
            || tenant.contains("..")
        {
            return Err(unknown());
        }
        let candidate = self.tenants_dir.join(format!("{}.{}", tenant, TENANT_EXT));
        if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(unknown())
        }
    }

    #[instrument(skip(self))]
    pub async fn get_engine(&self, tenant: &str) -> Result<SharedEngine, BotError> {
        if let Some(engine) = self.cache.get(tenant) {
            return Ok(engine.clone());
        }

        let path = self.path_for(tenant)?;
        let engine = Arc::new(RwLock::new(PricingEngine::load(&path).await?));
        // A concurrent load of the same tenant may have won; keep the first one.
        let engine = self
            .cache
            .entry(tenant.to_string())
            .or_insert(engine)
            .clone();
        Ok(engine)
    }

    /// Picks the tenant for a request: the tenant header wins, then (when
    /// enabled) the dialed number, translated through the tenants' DID lists
    /// when one matches.
    pub fn resolve_tenant_name<'a, F>(
        &self,
        get_header: F,
        header_name: &str,
        use_did: bool,
    ) -> Option<String>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        if let Some(t) = get_header(header_name).map(str::trim).filter(|t| !t.is_empty()) {
            return Some(t.to_string());
        }
        if !use_did {
            return None;
        }
        let did = DID_HEADERS
            .iter()
            .find_map(|h| get_header(h).filter(|v| !v.trim().is_empty()))?;
        let did = normalize_did(did);
        Some(
            self.tenant_for_did(&did)
                .map(str::to_string)
                .unwrap_or(did),
        )
    }
}

fn normalize_did(did: &str) -> String {
    did.chars().filter(|c| !c.is_whitespace()).collect()
}

fn tenant_key(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}

fn tenant_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == TENANT_EXT))
        .collect()
}

fn load_did_map(dir: &Path) -> HashMap<String, String> {
    let mut mapping = HashMap::new();
    for path in tenant_files(dir) {
        let Some(key) = tenant_key(&path) else { continue };
        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|raw| TenantConfig::from_toml_str(&raw).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => {
                for did in config.dids() {
                    mapping.insert(normalize_did(did), key.clone());
                }
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable tenant file"),
        }
    }
    mapping
}
