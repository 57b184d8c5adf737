//! Loading academy configuration (prompts + optional level bank) from TOML.
//!
//! See `AcademyConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Level, LessonPart, QuizQuestion};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AcademyConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Optional replacement course catalog. When present and valid, it is used
  /// instead of the built-in eight-level course.
  #[serde(default)]
  pub levels: Vec<LevelCfg>,
}

/// Level entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct LevelCfg {
  pub id: u32,
  pub title: String,
  pub description: String,
  #[serde(default)] pub icon: String,
  #[serde(default)] pub color: String,
  pub lessons: Vec<LessonCfg>,
  pub quiz: Vec<QuestionCfg>,
  pub xp_reward: u32,
  #[serde(default = "default_locked")] pub is_locked: bool,
}

fn default_locked() -> bool {
  true
}

#[derive(Clone, Debug, Deserialize)]
pub struct LessonCfg {
  pub title: String,
  pub content: String,
  #[serde(default)] pub image: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub id: String,
  pub question: String,
  pub options: Vec<String>,
  pub correct_answer_index: usize,
  pub explanation: String,
}

/// Convert a TOML level entry into the domain model (snake_case config keys,
/// camelCase wire format).
pub fn level_from_cfg(cfg: LevelCfg) -> Level {
  Level {
    id: cfg.id,
    title: cfg.title,
    description: cfg.description,
    icon: cfg.icon,
    color: cfg.color,
    lessons: cfg
      .lessons
      .into_iter()
      .map(|l| LessonPart { title: l.title, content: l.content, image: l.image })
      .collect(),
    quiz: cfg
      .quiz
      .into_iter()
      .map(|q| QuizQuestion {
        id: q.id,
        question: q.question,
        options: q.options,
        correct_answer_index: q.correct_answer_index,
        explanation: q.explanation,
      })
      .collect(),
    xp_reward: cfg.xp_reward,
    is_locked: cfg.is_locked,
  }
}

/// Prompts used by the OpenAI client. Defaults reproduce the academy's
/// production persona and question-generation instructions; override in TOML
/// to tune tone or structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  /// System persona for the mentor chat.
  pub mentor_system: String,
  /// System instruction for JSON-mode question generation.
  pub questions_system: String,
  /// User template for question generation; `{lesson_context}` is filled with
  /// the level's joined lesson content.
  pub questions_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      mentor_system: "Ты — Senior Blockchain Engineer и главный ментор академии WingsNodeTeam (WNT). Стиль: профессиональный и четкий. Формат: Markdown. Используй списки, выделяй **термины**, код в ```.".into(),
      questions_system: "Ты генерируешь только корректный JSON без лишнего текста.".into(),
      questions_user_template: "На основе материала ниже создай ровно 3 сложных ситуативных вопроса уровня Senior/Expert.\nТребования:\n1) Формат \"Ситуация -> Решение\".\n2) 4 варианта ответов, один верный.\n3) Подробное техническое объяснение.\nВерни JSON: {\"questions\":[{\"id\":\"string\",\"question\":\"string\",\"options\":[\"string\",\"string\",\"string\",\"string\"],\"correctAnswerIndex\":0,\"explanation\":\"string\"}...]}\nМатериал:\n{lesson_context}".into(),
    }
  }
}

/// Attempt to load `AcademyConfig` from ACADEMY_CONFIG_PATH. On any
/// parsing/IO error, returns None.
pub fn load_academy_config_from_env() -> Option<AcademyConfig> {
  let path = std::env::var("ACADEMY_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AcademyConfig>(&s) {
      Ok(cfg) => {
        info!(target: "academy_backend", %path, "Loaded academy config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "academy_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "academy_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_prompts_are_populated() {
    let p = Prompts::default();
    assert!(p.mentor_system.contains("WingsNodeTeam"));
    assert!(p.questions_user_template.contains("{lesson_context}"));
  }

  #[test]
  fn level_bank_parses_from_toml() {
    let raw = r#"
      [[levels]]
      id = 1
      title = "Intro"
      description = "d"
      xp_reward = 100
      is_locked = false

      [[levels.lessons]]
      title = "l"
      content = "c"

      [[levels.quiz]]
      id = "q1"
      question = "?"
      options = ["a", "b", "c", "d"]
      correct_answer_index = 2
      explanation = "e"
    "#;
    let cfg: AcademyConfig = toml::from_str(raw).expect("toml");
    assert_eq!(cfg.levels.len(), 1);
    let level = level_from_cfg(cfg.levels.into_iter().next().expect("level"));
    assert_eq!(level.id, 1);
    assert!(!level.is_locked);
    assert_eq!(level.quiz[0].correct_answer_index, 2);
    assert!(level.quiz[0].is_well_formed());
  }

  #[test]
  fn lock_flag_defaults_to_true() {
    let raw = r#"
      [[levels]]
      id = 1
      title = "Intro"
      description = "d"
      xp_reward = 100

      [[levels.lessons]]
      title = "l"
      content = "c"

      [[levels.quiz]]
      id = "q1"
      question = "?"
      options = ["a", "b", "c", "d"]
      correct_answer_index = 0
      explanation = "e"
    "#;
    let cfg: AcademyConfig = toml::from_str(raw).expect("toml");
    assert!(cfg.levels[0].is_locked);
  }
}
