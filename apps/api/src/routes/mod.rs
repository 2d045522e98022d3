pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::credits::handlers as credit_handlers;
use crate::state::AppState;
use crate::workflow::handlers as workflow_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session workflow API
        .route("/api/v1/sessions", post(workflow_handlers::handle_activate))
        .route(
            "/api/v1/sessions/:id",
            get(workflow_handlers::handle_get_session),
        )
        .route(
            "/api/v1/sessions/:id/generate",
            post(workflow_handlers::handle_generate),
        )
        .route(
            "/api/v1/sessions/:id/improve",
            post(workflow_handlers::handle_improve),
        )
        .route(
            "/api/v1/sessions/:id/letter",
            get(workflow_handlers::handle_get_letter),
        )
        .route(
            "/api/v1/sessions/:id/history",
            get(workflow_handlers::handle_history),
        )
        .route(
            "/api/v1/sessions/:id/history/:index/restore",
            post(workflow_handlers::handle_restore),
        )
        .route(
            "/api/v1/sessions/:id/messages",
            get(workflow_handlers::handle_messages),
        )
        // Admin API (development only; gated inside the handler)
        .route(
            "/api/v1/admin/access-codes",
            post(credit_handlers::handle_issue_codes),
        )
        .with_state(state)
}
