//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - the LLM proxy endpoints at their public paths (`/api/chat`, `/api/questions`)
/// - the player session API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // LLM proxies
        .route("/api/chat", post(http::http_post_chat))
        .route("/api/questions", post(http::http_post_questions))
        // Session API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/session", post(http::http_create_session))
        .route("/api/v1/session/:id", get(http::http_get_session))
        .route("/api/v1/session/:id/level/:level_id/select", post(http::http_select_level))
        .route("/api/v1/session/:id/level/exit", post(http::http_exit_level))
        .route("/api/v1/session/:id/lesson/next", post(http::http_next_lesson))
        .route("/api/v1/session/:id/quiz/answer", post(http::http_quiz_answer))
        .route("/api/v1/session/:id/quiz/advance", post(http::http_quiz_advance))
        .route("/api/v1/session/:id/tick", post(http::http_tick))
        .route("/api/v1/session/:id/achievements/dismiss", post(http::http_dismiss_achievement))
        .route("/api/v1/session/:id/certificate", get(http::http_certificate))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
