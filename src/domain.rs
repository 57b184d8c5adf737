//! Domain models used by the backend: course levels, lesson parts, quiz
//! questions, and chat messages.

use serde::{Deserialize, Serialize};

/// Every multiple-choice question carries exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A content unit on the course map: ordered lessons followed by a quiz.
/// Immutable after load; `id`s are contiguous and 1-based.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
  pub id: u32,
  pub title: String,
  pub description: String,
  /// Presentation hints carried for the SPA (emoji badge + gradient class).
  pub icon: String,
  pub color: String,
  pub lessons: Vec<LessonPart>,
  pub quiz: Vec<QuizQuestion>,
  /// Max XP available for a perfect quiz score.
  pub xp_reward: u32,
  pub is_locked: bool,
}

/// A single lesson page, read in sequence.
#[derive(Clone, Debug, Serialize)]
pub struct LessonPart {
  pub title: String,
  pub content: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
}

/// Multiple-choice question with one authoritative correct option.
/// Generated questions get a freshly minted unique id at creation time.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
  pub id: String,
  pub question: String,
  pub options: Vec<String>,
  pub correct_answer_index: usize,
  pub explanation: String,
}

impl QuizQuestion {
  /// Shape check applied to untrusted (generated) items before they are
  /// merged into a quiz: non-empty text, exactly four non-empty options,
  /// correct index in range.
  pub fn is_well_formed(&self) -> bool {
    !self.question.trim().is_empty()
      && self.options.len() == OPTIONS_PER_QUESTION
      && self.options.iter().all(|o| !o.trim().is_empty())
      && self.correct_answer_index < OPTIONS_PER_QUESTION
  }
}

/// Chat roles exactly as the SPA sends them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
  User,
  Model,
}

/// One entry of the mentor-chat transcript kept by the SPA.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role: ChatRole,
  pub text: String,
  #[serde(default)]
  pub timestamp: i64,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn question(options: usize, correct: usize) -> QuizQuestion {
    QuizQuestion {
      id: "q".into(),
      question: "Что такое блокчейн?".into(),
      options: (0..options).map(|i| format!("вариант {i}")).collect(),
      correct_answer_index: correct,
      explanation: "пояснение".into(),
    }
  }

  #[test]
  fn well_formed_accepts_four_options_in_range() {
    assert!(question(4, 0).is_well_formed());
    assert!(question(4, 3).is_well_formed());
  }

  #[test]
  fn well_formed_rejects_bad_shapes() {
    assert!(!question(3, 0).is_well_formed());
    assert!(!question(5, 0).is_well_formed());
    assert!(!question(4, 4).is_well_formed());
    let mut q = question(4, 1);
    q.question = "  ".into();
    assert!(!q.is_well_formed());
    let mut q = question(4, 1);
    q.options[2] = String::new();
    assert!(!q.is_well_formed());
  }
}
