pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use handlers::*;
pub use middleware::*;
pub use routes::*;
pub use state::*;

use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Router with every route, the demo mount and the middleware stack.
pub fn build_app(state: AppState) -> Router {
    let max_body_bytes = (state.config.server.max_request_body_size_mb as usize) * 1024 * 1024;
    let public_dir = state.config.server.public_dir.clone();
    let app = mount_demo(build_router(state), &public_dir);
    apply_middleware(app, max_body_bytes)
}

pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub async fn start_server<F>(
    state: AppState,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind = format!("{}:{}", state.config.server.bind, state.config.server.port);
    let listener = TcpListener::bind(&bind).await?;
    info!("Phonebot API listening on {}", bind);
    serve(listener, state, shutdown).await
}
