pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers::{self as analysis, ANALYZE_BODY_LIMIT};
use crate::builder::handlers as builder;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route(
            "/api/v1/resumes/analyze",
            post(analysis::handle_analyze).layer(DefaultBodyLimit::max(ANALYZE_BODY_LIMIT)),
        )
        .route("/api/v1/resumes", get(analysis::handle_list_resumes))
        .route("/api/v1/resumes/:id", get(analysis::handle_get_resume))
        // Builder API
        .route("/api/v1/builder", post(builder::handle_start))
        .route(
            "/api/v1/builder/:id",
            get(builder::handle_get_session).delete(builder::handle_abandon),
        )
        .route("/api/v1/builder/:id/actions", post(builder::handle_action))
        .route(
            "/api/v1/builder/:id/prompt",
            get(builder::handle_prompt_preview),
        )
        .route("/api/v1/builder/:id/generate", post(builder::handle_generate))
        .with_state(state)
}
