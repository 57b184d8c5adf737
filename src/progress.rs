//! Progression engine: owns the per-player user state and the rules for
//! unlocking levels, crediting quiz results, and deriving the player level.
//!
//! All mutation goes through the named operations below; locked-level
//! selection and repeated completion are silent no-ops, not errors.

use std::collections::BTreeSet;

use tracing::{info, instrument};

use crate::achievements::AchievementNotifier;
use crate::catalog::Catalog;
use crate::domain::Level;
use crate::quiz::QuizSession;

/// Every full 500 XP raises the derived player level by one.
pub const XP_PER_LEVEL: u32 = 500;

pub const DEFAULT_PLAYER_NAME: &str = "Cadet";

/// Per-session user state. Created once with defaults; xp, score,
/// completed ids and elapsed time only ever grow.
#[derive(Clone, Debug)]
pub struct UserState {
  pub xp: u32,
  pub score: u32,
  pub completed_level_ids: BTreeSet<u32>,
  pub name: String,
  pub total_time_seconds: u64,
}

impl UserState {
  pub fn new(name: String) -> Self {
    Self {
      xp: 0,
      score: 0,
      completed_level_ids: BTreeSet::new(),
      name,
      total_time_seconds: 0,
    }
  }

  /// Derived player level; never stored independently of xp.
  pub fn level(&self) -> u32 {
    level_for_xp(self.xp)
  }
}

pub fn level_for_xp(xp: u32) -> u32 {
  xp / XP_PER_LEVEL + 1
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnlockStatus {
  Locked,
  Unlocked,
}

/// Pure unlock rule: a level is open if it was never lock-gated, is the
/// first level, or the previous level has been completed.
pub fn unlock_status(level: &Level, completed: &BTreeSet<u32>) -> UnlockStatus {
  if !level.is_locked || level.id == 1 || completed.contains(&(level.id - 1)) {
    UnlockStatus::Unlocked
  } else {
    UnlockStatus::Locked
  }
}

/// Lesson cursor for the active level. Deliberately distinct from the quiz
/// cursor: the two never share an index.
#[derive(Clone, Debug)]
pub struct LessonProgress {
  pub level_id: u32,
  pub part: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SelectOutcome {
  Selected,
  /// Gating no-op: the level is still locked.
  Locked,
  NotFound,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LessonAdvance {
  /// Moved to the next lesson part.
  Advanced,
  /// The last lesson was finished; a quiz attempt has been created and the
  /// dynamic-question fetch should be issued with this tag and context.
  QuizStarted {
    attempt: String,
    level_id: u32,
    lesson_context: String,
  },
  NoActiveLesson,
}

#[derive(Debug, PartialEq)]
pub enum CompletionOutcome {
  Credited {
    xp_earned: u32,
    score_earned: u32,
    certificate_ready: bool,
  },
  /// Repeat completion: the id is already recorded, nothing is re-credited.
  AlreadyCompleted,
  NotFound,
  /// Contract violation guard: a quiz can never report zero questions.
  NoQuestions,
}

/// One player's whole server-side state: user stats, lesson cursor, quiz
/// attempt, and the achievement notifier watching every mutation.
#[derive(Clone, Debug)]
pub struct PlayerSession {
  pub id: String,
  pub user: UserState,
  pub lesson: Option<LessonProgress>,
  pub quiz: Option<QuizSession>,
  pub notifier: AchievementNotifier,
  pub certificate_ready: bool,
}

impl PlayerSession {
  pub fn new(id: String, name: Option<String>) -> Self {
    let name = name
      .map(|n| n.trim().to_string())
      .filter(|n| !n.is_empty())
      .unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string());
    Self {
      id,
      user: UserState::new(name),
      lesson: None,
      quiz: None,
      notifier: AchievementNotifier::new(),
      certificate_ready: false,
    }
  }

  /// Activate a level: silent no-op when locked, otherwise reset the lesson
  /// cursor to the first part. Any in-flight quiz attempt is discarded, so a
  /// late dynamic-question response for it will no longer match.
  #[instrument(level = "debug", skip(self, catalog), fields(session = %self.id, %level_id))]
  pub fn select_level(&mut self, catalog: &Catalog, level_id: u32) -> SelectOutcome {
    let Some(level) = catalog.get(level_id) else {
      return SelectOutcome::NotFound;
    };
    if unlock_status(level, &self.user.completed_level_ids) == UnlockStatus::Locked {
      return SelectOutcome::Locked;
    }
    self.lesson = Some(LessonProgress { level_id, part: 0 });
    self.quiz = None;
    SelectOutcome::Selected
  }

  /// Leave the active level (modal closed). Drops both cursors; a pending
  /// dynamic-question fetch becomes stale.
  pub fn exit_level(&mut self) {
    self.lesson = None;
    self.quiz = None;
  }

  /// Move the lesson cursor forward; finishing the last part creates the
  /// quiz attempt seeded with the level's static bank.
  #[instrument(level = "debug", skip(self, catalog), fields(session = %self.id))]
  pub fn advance_lesson(&mut self, catalog: &Catalog) -> LessonAdvance {
    let Some(cursor) = &mut self.lesson else {
      return LessonAdvance::NoActiveLesson;
    };
    let Some(level) = catalog.get(cursor.level_id) else {
      return LessonAdvance::NoActiveLesson;
    };
    if cursor.part + 1 < level.lessons.len() {
      cursor.part += 1;
      return LessonAdvance::Advanced;
    }

    let quiz = QuizSession::begin(level.id, level.quiz.clone());
    let attempt = quiz.attempt.clone();
    let lesson_context = level
      .lessons
      .iter()
      .map(|l| l.content.as_str())
      .collect::<Vec<_>>()
      .join("\n");
    self.lesson = None;
    self.quiz = Some(quiz);
    LessonAdvance::QuizStarted { attempt, level_id: level.id, lesson_context }
  }

  /// Credit a finished quiz. Idempotent per level id: xp/score are granted
  /// only the first time, `completed_level_ids` gains the id exactly once.
  #[instrument(level = "info", skip(self, catalog), fields(session = %self.id, %level_id, quiz_score, total_questions))]
  pub fn complete_level(
    &mut self,
    catalog: &Catalog,
    level_id: u32,
    quiz_score: u32,
    total_questions: usize,
  ) -> CompletionOutcome {
    let Some(level) = catalog.get(level_id) else {
      return CompletionOutcome::NotFound;
    };
    if total_questions == 0 {
      return CompletionOutcome::NoQuestions;
    }

    self.lesson = None;
    self.quiz = None;

    let is_last = level_id == catalog.last_id();
    if is_last {
      self.certificate_ready = true;
    }

    if self.user.completed_level_ids.contains(&level_id) {
      return CompletionOutcome::AlreadyCompleted;
    }

    let accuracy = quiz_score as f64 / total_questions as f64;
    let xp_earned = (level.xp_reward as f64 * accuracy).round() as u32;
    let score_earned = (accuracy * 1000.0).round() as u32;

    self.user.completed_level_ids.insert(level_id);
    self.user.xp += xp_earned;
    self.user.score += score_earned;
    self.notifier.observe(&self.user, catalog.len());

    info!(
      target: "progress",
      session = %self.id,
      %level_id,
      xp_earned,
      score_earned,
      xp = self.user.xp,
      player_level = self.user.level(),
      "Level completed"
    );
    CompletionOutcome::Credited { xp_earned, score_earned, certificate_ready: is_last }
  }

  /// One-second time tick. The engine counts unconditionally; suppressing
  /// ticks while the surface is backgrounded is the caller's policy. Also
  /// drives the achievement toast timer.
  pub fn tick_time(&mut self) {
    self.user.total_time_seconds += 1;
    self.notifier.tick();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::builtin_levels;

  fn catalog() -> Catalog {
    Catalog::new(builtin_levels()).expect("builtin catalog")
  }

  fn session() -> PlayerSession {
    PlayerSession::new("s1".into(), None)
  }

  #[test]
  fn derived_level_boundaries() {
    assert_eq!(level_for_xp(0), 1);
    assert_eq!(level_for_xp(499), 1);
    assert_eq!(level_for_xp(500), 2);
    assert_eq!(level_for_xp(999), 2);
  }

  #[test]
  fn locked_level_unlocks_only_after_previous_completion() {
    let catalog = catalog();
    let mut completed = BTreeSet::new();
    let level2 = catalog.get(2).expect("level 2");
    assert_eq!(unlock_status(level2, &completed), UnlockStatus::Locked);
    completed.insert(1);
    assert_eq!(unlock_status(level2, &completed), UnlockStatus::Unlocked);
  }

  #[test]
  fn first_level_is_always_unlocked() {
    let catalog = catalog();
    let level1 = catalog.get(1).expect("level 1");
    assert_eq!(unlock_status(level1, &BTreeSet::new()), UnlockStatus::Unlocked);
  }

  #[test]
  fn selecting_a_locked_level_is_a_silent_noop() {
    let catalog = catalog();
    let mut s = session();
    assert_eq!(s.select_level(&catalog, 2), SelectOutcome::Locked);
    assert!(s.lesson.is_none());
    assert_eq!(s.select_level(&catalog, 1), SelectOutcome::Selected);
    let cursor = s.lesson.as_ref().expect("cursor");
    assert_eq!((cursor.level_id, cursor.part), (1, 0));
  }

  #[test]
  fn selecting_an_unknown_level_is_a_noop() {
    let catalog = catalog();
    let mut s = session();
    assert_eq!(s.select_level(&catalog, 99), SelectOutcome::NotFound);
    assert!(s.lesson.is_none());
  }

  #[test]
  fn completion_credits_rounded_xp_and_score() {
    let catalog = catalog();
    let mut s = session();
    let outcome = s.complete_level(&catalog, 1, 3, 5);
    assert_eq!(
      outcome,
      CompletionOutcome::Credited { xp_earned: 60, score_earned: 600, certificate_ready: false }
    );
    assert_eq!(s.user.xp, 60);
    assert_eq!(s.user.score, 600);
    assert_eq!(s.user.level(), 1);
  }

  #[test]
  fn completion_is_idempotent_per_level() {
    let catalog = catalog();
    let mut s = session();
    s.complete_level(&catalog, 1, 5, 5);
    let xp = s.user.xp;
    let score = s.user.score;
    assert_eq!(s.complete_level(&catalog, 1, 5, 5), CompletionOutcome::AlreadyCompleted);
    assert_eq!(s.user.xp, xp);
    assert_eq!(s.user.score, score);
    assert_eq!(s.user.completed_level_ids.iter().filter(|id| **id == 1).count(), 1);
  }

  #[test]
  fn completing_an_unknown_level_is_a_noop() {
    let catalog = catalog();
    let mut s = session();
    assert_eq!(s.complete_level(&catalog, 42, 1, 1), CompletionOutcome::NotFound);
    assert_eq!(s.user.xp, 0);
  }

  #[test]
  fn zero_questions_is_rejected() {
    let catalog = catalog();
    let mut s = session();
    assert_eq!(s.complete_level(&catalog, 1, 0, 0), CompletionOutcome::NoQuestions);
  }

  #[test]
  fn only_the_final_level_signals_certificate() {
    let catalog = catalog();
    let mut s = session();
    s.complete_level(&catalog, 1, 1, 1);
    assert!(!s.certificate_ready);
    for id in 2..=catalog.last_id() {
      s.complete_level(&catalog, id, 1, 1);
    }
    assert!(s.certificate_ready);
  }

  #[test]
  fn lesson_advance_walks_parts_then_starts_quiz() {
    let catalog = catalog();
    let mut s = session();
    s.select_level(&catalog, 1);
    let parts = catalog.get(1).expect("level").lessons.len();
    for _ in 1..parts {
      assert_eq!(s.advance_lesson(&catalog), LessonAdvance::Advanced);
    }
    match s.advance_lesson(&catalog) {
      LessonAdvance::QuizStarted { level_id, lesson_context, .. } => {
        assert_eq!(level_id, 1);
        assert!(!lesson_context.is_empty());
      }
      other => panic!("expected quiz start, got {other:?}"),
    }
    assert!(s.lesson.is_none());
    assert!(s.quiz.is_some());
  }

  #[test]
  fn tick_accumulates_time() {
    let mut s = session();
    s.tick_time();
    s.tick_time();
    assert_eq!(s.user.total_time_seconds, 2);
  }
}
