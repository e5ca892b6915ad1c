use axum::{
    routing::{delete, get, post, put},
    Router,
};
use crate::{handlers::*, AppState};

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health and metrics
        .route("/healthz", get(health_check))
        .route("/metrics", get(metrics))

        // Reasoning
        .route("/reason", post(reason))
        .route("/reason_and_act", post(reason_and_act))
        .route("/dialog", post(dialog))

        // Availability, quotes, leads and booking
        .route("/check_availability", post(check_availability))
        .route("/quote", post(quote))
        .route("/create_lead", post(create_lead))
        .route("/book", post(book))

        // Call workflow
        .route("/calls/:call_id/turns", post(call_turn))
        .route("/calls/:call_id", delete(end_call))

        // Speech
        .route("/speech", post(speech))

        // Inventory admin
        .route("/admin/inventory", get(admin_list_inventory))
        .route("/admin/inventory", post(admin_create_item))
        .route("/admin/inventory/:item_id", put(admin_update_item))
        .route("/admin/inventory/:item_id", delete(admin_delete_item))
}

pub fn build_router(state: AppState) -> Router {
    create_router().with_state(state)
}
