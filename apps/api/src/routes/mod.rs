pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/competencies", get(handlers::handle_competencies))
        // Session
        .route("/api/v1/session", get(handlers::handle_get_session))
        .route("/api/v1/session/start", post(handlers::handle_start))
        .route("/api/v1/session/intake", put(handlers::handle_update_intake))
        .route("/api/v1/session/prep", post(handlers::handle_generate_prep))
        .route(
            "/api/v1/session/question",
            post(handlers::handle_request_question),
        )
        .route("/api/v1/session/answer", put(handlers::handle_set_answer))
        .route(
            "/api/v1/session/answer/builder",
            post(handlers::handle_build_answer),
        )
        .route(
            "/api/v1/session/speech",
            post(handlers::handle_speech_fragment),
        )
        .route(
            "/api/v1/session/speech/start",
            post(handlers::handle_start_listening),
        )
        .route(
            "/api/v1/session/speech/stop",
            post(handlers::handle_stop_listening),
        )
        .route(
            "/api/v1/session/feedback",
            post(handlers::handle_submit_answer),
        )
        .route("/api/v1/session/plan", post(handlers::handle_request_plan))
        .route("/api/v1/session/reset", post(handlers::handle_reset))
        .route("/api/v1/session/export", get(handlers::handle_export))
        .with_state(state)
}
