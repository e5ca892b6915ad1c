use axum::{extract::DefaultBodyLimit, Router};
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Request tracing, permissive CORS and a request body cap.
pub fn apply_middleware(router: Router, max_body_bytes: usize) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(DefaultBodyLimit::max(max_body_bytes)),
    )
}

/// Serves `public_dir` under `/demo` when the directory exists.
pub fn mount_demo(router: Router, public_dir: &str) -> Router {
    if Path::new(public_dir).is_dir() {
        info!(dir = %public_dir, "Serving demo page under /demo");
        router.nest_service(
            "/demo",
            ServeDir::new(public_dir).append_index_html_on_directories(true),
        )
    } else {
        router
    }
}
