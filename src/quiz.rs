//! Quiz session controller: the transient state machine over one quiz
//! attempt, including the merge of the static bank with generated challenge
//! questions.
//!
//! States: AwaitingQuestions → QuestionActive → AnswerRevealed →
//! (QuestionActive | Completed). The first answer per question is final;
//! questions are never reordered.

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::QuizQuestion;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
  AwaitingQuestions,
  QuestionActive,
  AnswerRevealed,
  Completed,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
  Recorded { correct: bool },
  /// Gating no-op: wrong phase, out-of-range index, or re-selection after
  /// the reveal.
  Ignored,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
  NextQuestion,
  /// The attempt is over; report `(score, total)` to the progression engine.
  Finished { score: u32, total: usize },
  Ignored,
}

/// One quiz attempt. Created when the level's last lesson is finished,
/// destroyed when the quiz is exited or completed.
#[derive(Clone, Debug)]
pub struct QuizSession {
  pub level_id: u32,
  /// Tag for the dynamic-question fetch issued for this attempt; responses
  /// carrying any other tag are stale and must be discarded.
  pub attempt: String,
  pub phase: QuizPhase,
  questions: Vec<QuizQuestion>,
  pub current: usize,
  pub score: u32,
  pub selected: Option<usize>,
}

impl QuizSession {
  /// Start an attempt holding the static bank, waiting for the dynamic
  /// augmentation to resolve.
  pub fn begin(level_id: u32, static_bank: Vec<QuizQuestion>) -> Self {
    Self {
      level_id,
      attempt: Uuid::new_v4().to_string(),
      phase: QuizPhase::AwaitingQuestions,
      questions: static_bank,
      current: 0,
      score: 0,
      selected: None,
    }
  }

  /// Append generated questions (static order preserved, dynamic after) and
  /// open the first question. An empty list is identical to "no bonus
  /// questions". Returns false when the response is stale — wrong attempt
  /// tag or the attempt already moved on — in which case it is discarded.
  pub fn install_dynamic(&mut self, attempt: &str, dynamic: Vec<QuizQuestion>) -> bool {
    if self.attempt != attempt || self.phase != QuizPhase::AwaitingQuestions {
      warn!(target: "progress", level_id = self.level_id, "Discarding stale dynamic-question response");
      return false;
    }
    debug!(target: "progress", level_id = self.level_id, added = dynamic.len(), "Dynamic questions installed");
    self.questions.extend(dynamic);
    self.phase = QuizPhase::QuestionActive;
    self.current = 0;
    self.score = 0;
    self.selected = None;
    true
  }

  pub fn total(&self) -> usize {
    self.questions.len()
  }

  pub fn questions(&self) -> &[QuizQuestion] {
    &self.questions
  }

  pub fn current_question(&self) -> Option<&QuizQuestion> {
    match self.phase {
      QuizPhase::QuestionActive | QuizPhase::AnswerRevealed => self.questions.get(self.current),
      _ => None,
    }
  }

  /// Record the answer for the active question. Valid only while the
  /// question is active; the first selection is final.
  pub fn select_answer(&mut self, index: usize) -> AnswerOutcome {
    if self.phase != QuizPhase::QuestionActive {
      return AnswerOutcome::Ignored;
    }
    let Some(question) = self.questions.get(self.current) else {
      return AnswerOutcome::Ignored;
    };
    if index >= question.options.len() {
      return AnswerOutcome::Ignored;
    }
    let correct = index == question.correct_answer_index;
    if correct {
      self.score += 1;
    }
    self.selected = Some(index);
    self.phase = QuizPhase::AnswerRevealed;
    AnswerOutcome::Recorded { correct }
  }

  /// Move past a revealed answer: next question, or finish the attempt.
  pub fn advance(&mut self) -> AdvanceOutcome {
    if self.phase != QuizPhase::AnswerRevealed {
      return AdvanceOutcome::Ignored;
    }
    if self.current + 1 < self.questions.len() {
      self.current += 1;
      self.selected = None;
      self.phase = QuizPhase::QuestionActive;
      AdvanceOutcome::NextQuestion
    } else {
      self.phase = QuizPhase::Completed;
      AdvanceOutcome::Finished { score: self.score, total: self.questions.len() }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn question(id: &str, correct: usize) -> QuizQuestion {
    QuizQuestion {
      id: id.into(),
      question: format!("вопрос {id}"),
      options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
      correct_answer_index: correct,
      explanation: "пояснение".into(),
    }
  }

  fn bank(prefix: &str, n: usize) -> Vec<QuizQuestion> {
    (0..n).map(|i| question(&format!("{prefix}{i}"), 0)).collect()
  }

  #[test]
  fn dynamic_questions_append_after_static_in_order() {
    let mut s = QuizSession::begin(1, bank("s", 2));
    let attempt = s.attempt.clone();
    assert!(s.install_dynamic(&attempt, bank("d", 3)));
    assert_eq!(s.total(), 5);
    let ids: Vec<&str> = s.questions().iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, ["s0", "s1", "d0", "d1", "d2"]);
    assert_eq!(s.phase, QuizPhase::QuestionActive);
    assert_eq!((s.current, s.score), (0, 0));
  }

  #[test]
  fn empty_dynamic_fetch_proceeds_with_static_only() {
    let mut s = QuizSession::begin(1, bank("s", 2));
    let attempt = s.attempt.clone();
    assert!(s.install_dynamic(&attempt, vec![]));
    assert_eq!(s.total(), 2);
    assert_eq!(s.phase, QuizPhase::QuestionActive);
  }

  #[test]
  fn stale_attempt_tag_is_discarded() {
    let mut s = QuizSession::begin(1, bank("s", 2));
    assert!(!s.install_dynamic("some-other-attempt", bank("d", 3)));
    assert_eq!(s.total(), 2);
    assert_eq!(s.phase, QuizPhase::AwaitingQuestions);
  }

  #[test]
  fn second_install_is_discarded() {
    let mut s = QuizSession::begin(1, bank("s", 1));
    let attempt = s.attempt.clone();
    assert!(s.install_dynamic(&attempt, vec![]));
    assert!(!s.install_dynamic(&attempt, bank("d", 3)));
    assert_eq!(s.total(), 1);
  }

  #[test]
  fn scoring_counts_only_correct_answers() {
    let mut s = QuizSession::begin(1, vec![question("q0", 1), question("q1", 2), question("q2", 0)]);
    let attempt = s.attempt.clone();
    s.install_dynamic(&attempt, vec![]);

    assert_eq!(s.select_answer(1), AnswerOutcome::Recorded { correct: true });
    assert_eq!(s.advance(), AdvanceOutcome::NextQuestion);
    assert_eq!(s.select_answer(3), AnswerOutcome::Recorded { correct: false });
    assert_eq!(s.advance(), AdvanceOutcome::NextQuestion);
    assert_eq!(s.select_answer(0), AnswerOutcome::Recorded { correct: true });
    assert_eq!(s.advance(), AdvanceOutcome::Finished { score: 2, total: 3 });
    assert_eq!(s.phase, QuizPhase::Completed);
  }

  #[test]
  fn reselection_after_reveal_is_ignored() {
    let mut s = QuizSession::begin(1, vec![question("q0", 1)]);
    let attempt = s.attempt.clone();
    s.install_dynamic(&attempt, vec![]);

    assert_eq!(s.select_answer(0), AnswerOutcome::Recorded { correct: false });
    assert_eq!(s.select_answer(1), AnswerOutcome::Ignored);
    assert_eq!(s.selected, Some(0));
    assert_eq!(s.score, 0);
  }

  #[test]
  fn out_of_range_answer_is_ignored() {
    let mut s = QuizSession::begin(1, vec![question("q0", 1)]);
    let attempt = s.attempt.clone();
    s.install_dynamic(&attempt, vec![]);
    assert_eq!(s.select_answer(4), AnswerOutcome::Ignored);
    assert_eq!(s.phase, QuizPhase::QuestionActive);
  }

  #[test]
  fn advance_is_ignored_outside_reveal() {
    let mut s = QuizSession::begin(1, bank("s", 2));
    assert_eq!(s.advance(), AdvanceOutcome::Ignored);
    let attempt = s.attempt.clone();
    s.install_dynamic(&attempt, vec![]);
    assert_eq!(s.advance(), AdvanceOutcome::Ignored);
  }

  #[test]
  fn answering_is_ignored_while_awaiting_questions() {
    let mut s = QuizSession::begin(1, bank("s", 2));
    assert_eq!(s.select_answer(0), AnswerOutcome::Ignored);
    assert_eq!(s.score, 0);
  }

  #[test]
  fn score_never_exceeds_total() {
    let mut s = QuizSession::begin(1, bank("s", 3));
    let attempt = s.attempt.clone();
    s.install_dynamic(&attempt, vec![]);
    loop {
      s.select_answer(0);
      assert!(s.score as usize <= s.total());
      match s.advance() {
        AdvanceOutcome::Finished { score, total } => {
          assert_eq!(score as usize, total);
          break;
        }
        _ => continue,
      }
    }
  }
}
