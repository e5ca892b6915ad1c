#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use phonebot_api::{build_app, AppState};
use phonebot_llm::Reasoner;
use phonebot_metrics::MetricsService;
use phonebot_models::Config;
use phonebot_testsupport::{
    sample_tenant_dir, EchoSlotExtractor, RecordingNotifier, TenantDir, TENANT,
};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const ADMIN_KEY: &str = "admin-secret";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
    pub tenants: TenantDir,
}

pub fn test_config(tenants: &TenantDir) -> Config {
    let mut config = Config::default();
    config.tenants.dir = tenants.path().to_string_lossy().to_string();
    config.admin.api_key = ADMIN_KEY.to_string();
    config.server.public_dir = tenants.path().join("public").to_string_lossy().to_string();
    config
}

pub fn test_app(reasoner: Arc<dyn Reasoner>) -> TestApp {
    let tenants = sample_tenant_dir().expect("tenant fixture");
    let notifier = Arc::new(RecordingNotifier::new());
    let state = AppState::new(
        test_config(&tenants),
        reasoner,
        Arc::new(EchoSlotExtractor),
        notifier.clone(),
        None,
        Arc::new(MetricsService::new().expect("metrics")),
    );
    TestApp {
        app: build_app(state.clone()),
        state,
        notifier,
        tenants,
    }
}

/// Request builder scoped to the sample tenant.
pub fn tenant_request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-Tenant", TENANT)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, value)
}

/// POSTs JSON as the sample tenant.
pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = tenant_request("POST", uri)
        .body(Body::from(body.to_string()))
        .expect("request");
    send(app, request).await
}
