//! Core behaviors shared by the HTTP handlers.
//!
//! This includes:
//!   - the two LLM proxy behaviors with their fixed fallbacks
//!   - player session operations (select/advance/answer/tick/dismiss)
//!   - the stale-response guard for the dynamic-question fetch

use tracing::{debug, error, info, instrument, warn};

use crate::certificate::{certificate_for, CertificateData};
use crate::domain::{ChatMessage, QuizQuestion};
use crate::progress::LessonAdvance;
use crate::protocol::{to_session_out, SessionOut};
use crate::quiz::AdvanceOutcome;
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Mentor chat proxy. Error codes mirror the public contract: the client
/// maps any failure to one fixed fallback message, so no detail leaks here.
#[instrument(level = "info", skip(state, history, user_message), fields(history = history.len(), msg_len = user_message.len()))]
pub async fn do_chat(
  state: &AppState,
  history: &[ChatMessage],
  user_message: &str,
) -> Result<String, &'static str> {
  let Some(oa) = &state.openai else {
    error!(target: "academy_backend", "Chat proxy called without OPENAI_API_KEY");
    return Err("missing_api_key");
  };
  debug!(target: "academy_backend", msg = %trunc_for_log(user_message, 120), "Mentor question");
  match oa.mentor_reply(&state.prompts, history, user_message).await {
    Ok(text) => Ok(text),
    Err(e) => {
      error!(target: "academy_backend", error = %e, "Mentor reply failed");
      Err("upstream_error")
    }
  }
}

/// Challenge-question proxy. Never fails: parse errors, missing key and
/// upstream failures all collapse to an empty list.
#[instrument(level = "info", skip(state, lesson_context), fields(ctx_len = lesson_context.len()))]
pub async fn do_generate_questions(state: &AppState, lesson_context: &str) -> Vec<QuizQuestion> {
  let Some(oa) = &state.openai else {
    warn!(target: "academy_backend", "Question generation skipped: no OPENAI_API_KEY");
    return Vec::new();
  };
  match oa.generate_challenge_questions(&state.prompts, lesson_context).await {
    Ok(questions) => questions,
    Err(e) => {
      error!(target: "academy_backend", error = %e, "Question generation failed; serving static bank only");
      Vec::new()
    }
  }
}

pub async fn create_session(state: &AppState, name: Option<String>) -> SessionOut {
  let session = state.create_session(name).await;
  to_session_out(&session, &state.catalog)
}

pub async fn snapshot(state: &AppState, session_id: &str) -> Option<SessionOut> {
  state
    .with_session(session_id, |s, catalog| to_session_out(s, catalog))
    .await
}

#[instrument(level = "info", skip(state), fields(%session_id, %level_id))]
pub async fn select_level(state: &AppState, session_id: &str, level_id: u32) -> Option<SessionOut> {
  state
    .with_session(session_id, |s, catalog| {
      let outcome = s.select_level(catalog, level_id);
      info!(target: "progress", session = %session_id, %level_id, ?outcome, "Level selection");
      to_session_out(s, catalog)
    })
    .await
}

pub async fn exit_level(state: &AppState, session_id: &str) -> Option<SessionOut> {
  state
    .with_session(session_id, |s, catalog| {
      s.exit_level();
      to_session_out(s, catalog)
    })
    .await
}

/// Advance the lesson cursor. Finishing the last lesson creates the quiz
/// attempt and performs the dynamic-question fetch outside the session lock;
/// the result is applied through the attempt tag so a response that arrives
/// after the player navigated away is discarded rather than applied to
/// stale state.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn advance_lesson(state: &AppState, session_id: &str) -> Option<SessionOut> {
  let advance = state
    .with_session(session_id, |s, catalog| s.advance_lesson(catalog))
    .await?;

  if let LessonAdvance::QuizStarted { attempt, level_id, lesson_context } = advance {
    info!(target: "progress", session = %session_id, %level_id, "Quiz attempt started; fetching challenge questions");
    let dynamic = do_generate_questions(state, &lesson_context).await;
    let installed = state
      .with_session(session_id, |s, _| {
        s.quiz
          .as_mut()
          .map(|quiz| quiz.install_dynamic(&attempt, dynamic))
          .unwrap_or(false)
      })
      .await;
    if installed != Some(true) {
      warn!(target: "progress", session = %session_id, %level_id, "Challenge questions arrived for an abandoned attempt; discarded");
    }
  }

  snapshot(state, session_id).await
}

#[instrument(level = "info", skip(state), fields(%session_id, index))]
pub async fn submit_answer(state: &AppState, session_id: &str, index: usize) -> Option<SessionOut> {
  state
    .with_session(session_id, |s, catalog| {
      if let Some(quiz) = s.quiz.as_mut() {
        let outcome = quiz.select_answer(index);
        debug!(target: "progress", session = %session_id, index, ?outcome, "Answer submitted");
      }
      to_session_out(s, catalog)
    })
    .await
}

/// Advance past a revealed answer; a finished attempt reports its result to
/// the progression engine.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn advance_quiz(state: &AppState, session_id: &str) -> Option<SessionOut> {
  state
    .with_session(session_id, |s, catalog| {
      if let Some(quiz) = s.quiz.as_mut() {
        let level_id = quiz.level_id;
        if let AdvanceOutcome::Finished { score, total } = quiz.advance() {
          let outcome = s.complete_level(catalog, level_id, score, total);
          info!(target: "progress", session = %session_id, %level_id, score, total, ?outcome, "Quiz finished");
        }
      }
      to_session_out(s, catalog)
    })
    .await
}

pub async fn tick(state: &AppState, session_id: &str) -> Option<SessionOut> {
  state
    .with_session(session_id, |s, catalog| {
      s.tick_time();
      to_session_out(s, catalog)
    })
    .await
}

pub async fn dismiss_achievement(state: &AppState, session_id: &str) -> Option<SessionOut> {
  state
    .with_session(session_id, |s, catalog| {
      s.notifier.dismiss();
      to_session_out(s, catalog)
    })
    .await
}

pub enum CertificateOutcome {
  Ready(CertificateData),
  NotEligible,
}

pub async fn certificate(state: &AppState, session_id: &str) -> Option<CertificateOutcome> {
  state
    .with_session(session_id, |s, _| {
      if s.certificate_ready {
        CertificateOutcome::Ready(certificate_for(&s.user))
      } else {
        CertificateOutcome::NotEligible
      }
    })
    .await
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::{collections::HashMap, sync::Arc};
  use tokio::sync::RwLock;

  use crate::catalog::{builtin_levels, Catalog};
  use crate::config::Prompts;
  use crate::quiz::QuizPhase;

  fn offline_state() -> AppState {
    AppState {
      catalog: Arc::new(Catalog::new(builtin_levels()).expect("catalog")),
      sessions: Arc::new(RwLock::new(HashMap::new())),
      openai: None,
      prompts: Prompts::default(),
    }
  }

  #[tokio::test]
  async fn chat_without_key_reports_missing_api_key() {
    let state = offline_state();
    assert_eq!(do_chat(&state, &[], "привет").await, Err("missing_api_key"));
  }

  #[tokio::test]
  async fn question_generation_degrades_to_empty() {
    let state = offline_state();
    assert!(do_generate_questions(&state, "материал").await.is_empty());
  }

  #[tokio::test]
  async fn full_level_walkthrough_credits_progress() {
    let state = offline_state();
    let out = create_session(&state, Some("Нео".into())).await;
    let id = out.id.clone();

    select_level(&state, &id, 1).await.expect("session");
    let lessons = state.catalog.get(1).expect("level").lessons.len();
    let mut out = None;
    for _ in 0..lessons {
      out = advance_lesson(&state, &id).await;
    }
    // No OpenAI key: the quiz proceeds with the static bank only.
    let quiz = out.as_ref().expect("snapshot").quiz.as_ref().expect("quiz");
    assert_eq!(quiz.phase, QuizPhase::QuestionActive);
    let total = quiz.total;
    assert_eq!(total, state.catalog.get(1).expect("level").quiz.len());

    let bank = state.catalog.get(1).expect("level").quiz.clone();
    for question in &bank {
      submit_answer(&state, &id, question.correct_answer_index)
        .await
        .expect("session");
      out = advance_quiz(&state, &id).await;
    }
    let out = out.expect("snapshot");
    assert!(out.quiz.is_none());
    assert!(out.user.completed_level_ids.contains(&1));
    // Perfect run: full xp reward and a 1000-point score.
    assert_eq!(out.user.xp, state.catalog.get(1).expect("level").xp_reward);
    assert_eq!(out.user.score, 1000);
  }

  #[tokio::test]
  async fn certificate_is_gated_by_eligibility() {
    let state = offline_state();
    let out = create_session(&state, None).await;
    let id = out.id;
    assert!(matches!(
      certificate(&state, &id).await,
      Some(CertificateOutcome::NotEligible)
    ));
    let last = state.catalog.last_id();
    state
      .with_session(&id, |s, catalog| {
        for level_id in 1..=last {
          s.complete_level(catalog, level_id, 1, 1);
        }
      })
      .await;
    match certificate(&state, &id).await {
      Some(CertificateOutcome::Ready(cert)) => assert_eq!(cert.filename, "WNT_Certificate.png"),
      _ => panic!("expected certificate"),
    }
    assert!(matches!(certificate(&state, "missing").await, None));
  }

  #[tokio::test]
  async fn unknown_session_is_none() {
    let state = offline_state();
    assert!(snapshot(&state, "missing").await.is_none());
    assert!(tick(&state, "missing").await.is_none());
  }
}
