//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

fn unknown_session() -> Response {
  (StatusCode::NOT_FOUND, Json(ErrorOut { error: "unknown_session" })).into_response()
}

fn session_reply(out: Option<SessionOut>) -> Response {
  match out {
    Some(out) => Json(out).into_response(),
    None => unknown_session(),
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

/// `POST /api/chat` — mentor chat proxy. Any failure maps to a non-2xx
/// status with a machine-readable code; the SPA shows its fixed fallback.
#[instrument(level = "info", skip(state, body), fields(history = body.history.len(), msg_len = body.user_message.len()))]
pub async fn http_post_chat(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChatIn>,
) -> Response {
  match do_chat(&state, &body.history, &body.user_message).await {
    Ok(text) => Json(ChatOut { text }).into_response(),
    Err(code @ "missing_api_key") => {
      (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorOut { error: code })).into_response()
    }
    Err(code) => (StatusCode::BAD_GATEWAY, Json(ErrorOut { error: code })).into_response(),
  }
}

/// `POST /api/questions` — challenge-question proxy. Always 200; an empty
/// list is the universal fallback.
#[instrument(level = "info", skip(state, body), fields(ctx_len = body.lesson_context.len()))]
pub async fn http_post_questions(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuestionsIn>,
) -> impl IntoResponse {
  let questions = do_generate_questions(&state, &body.lesson_context).await;
  info!(target: "academy_backend", served = questions.len(), "Challenge questions served");
  Json(QuestionsOut { questions })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_create_session(
  State(state): State<Arc<AppState>>,
  body: Option<Json<SessionCreateIn>>,
) -> impl IntoResponse {
  let name = body.and_then(|Json(b)| b.name);
  Json(create_session(&state, name).await)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  session_reply(snapshot(&state, &id).await)
}

#[instrument(level = "info", skip(state), fields(%id, level_id))]
pub async fn http_select_level(
  State(state): State<Arc<AppState>>,
  Path((id, level_id)): Path<(String, u32)>,
) -> Response {
  session_reply(select_level(&state, &id, level_id).await)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_exit_level(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  session_reply(exit_level(&state, &id).await)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_next_lesson(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  session_reply(advance_lesson(&state, &id).await)
}

#[instrument(level = "info", skip(state, body), fields(%id, index = body.index))]
pub async fn http_quiz_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> Response {
  session_reply(submit_answer(&state, &id, body.index).await)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_quiz_advance(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  session_reply(advance_quiz(&state, &id).await)
}

#[instrument(level = "debug", skip(state), fields(%id))]
pub async fn http_tick(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
  session_reply(tick(&state, &id).await)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_dismiss_achievement(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  session_reply(dismiss_achievement(&state, &id).await)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_certificate(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  match certificate(&state, &id).await {
    Some(CertificateOutcome::Ready(cert)) => Json(cert).into_response(),
    Some(CertificateOutcome::NotEligible) => {
      (StatusCode::CONFLICT, Json(ErrorOut { error: "not_eligible" })).into_response()
    }
    None => unknown_session(),
  }
}
