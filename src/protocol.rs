//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::achievements::AchievementDef;
use crate::catalog::Catalog;
use crate::domain::{ChatMessage, LessonPart, QuizQuestion};
use crate::progress::{unlock_status, PlayerSession, UnlockStatus};
use crate::quiz::{QuizPhase, QuizSession};

//
// LLM proxy DTOs
//

#[derive(Debug, Deserialize)]
pub struct ChatIn {
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    #[serde(rename = "userMessage", default)]
    pub user_message: String,
}

#[derive(Serialize)]
pub struct ChatOut {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionsIn {
    #[serde(rename = "lessonContext", default)]
    pub lesson_context: String,
}

#[derive(Serialize)]
pub struct QuestionsOut {
    pub questions: Vec<QuizQuestion>,
}

/// Fixed machine-readable error envelope (`missing_api_key`,
/// `upstream_error`, `unknown_session`, `not_eligible`).
#[derive(Serialize)]
pub struct ErrorOut {
    pub error: &'static str,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

//
// Session API DTOs
//

#[derive(Debug, Default, Deserialize)]
pub struct SessionCreateIn {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub index: usize,
}

/// Full player snapshot the SPA re-renders from after every operation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOut {
    pub id: String,
    pub user: UserOut,
    pub levels: Vec<LevelStatusOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson: Option<LessonOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<QuizOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievement: Option<&'static AchievementDef>,
    pub certificate_ready: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOut {
    pub xp: u32,
    pub score: u32,
    pub level: u32,
    pub completed_level_ids: Vec<u32>,
    pub name: String,
    pub total_time_seconds: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelAccess {
    Locked,
    Unlocked,
    Completed,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelStatusOut {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub lesson_count: usize,
    pub xp_reward: u32,
    pub access: LevelAccess,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonOut {
    pub level_id: u32,
    pub part_index: usize,
    pub part_count: usize,
    pub part: LessonPart,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOut {
    pub level_id: u32,
    pub phase: QuizPhase,
    pub current_index: usize,
    pub total: usize,
    pub score: u32,
    /// The active question, stripped of its correct index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionOut>,
    /// Set only once the answer is revealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal: Option<RevealOut>,
}

#[derive(Serialize)]
pub struct QuestionOut {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealOut {
    pub selected_index: usize,
    pub correct: bool,
    pub correct_answer_index: usize,
    pub explanation: String,
}

/// Convert a full `PlayerSession` (internal) to the public snapshot DTO.
pub fn to_session_out(session: &PlayerSession, catalog: &Catalog) -> SessionOut {
    let completed = &session.user.completed_level_ids;
    let levels = catalog
        .levels()
        .iter()
        .map(|level| {
            let access = if completed.contains(&level.id) {
                LevelAccess::Completed
            } else {
                match unlock_status(level, completed) {
                    UnlockStatus::Locked => LevelAccess::Locked,
                    UnlockStatus::Unlocked => LevelAccess::Unlocked,
                }
            };
            LevelStatusOut {
                id: level.id,
                title: level.title.clone(),
                description: level.description.clone(),
                icon: level.icon.clone(),
                color: level.color.clone(),
                lesson_count: level.lessons.len(),
                xp_reward: level.xp_reward,
                access,
            }
        })
        .collect();

    let lesson = session.lesson.as_ref().and_then(|cursor| {
        let level = catalog.get(cursor.level_id)?;
        let part = level.lessons.get(cursor.part)?;
        Some(LessonOut {
            level_id: cursor.level_id,
            part_index: cursor.part,
            part_count: level.lessons.len(),
            part: part.clone(),
        })
    });

    SessionOut {
        id: session.id.clone(),
        user: UserOut {
            xp: session.user.xp,
            score: session.user.score,
            level: session.user.level(),
            completed_level_ids: completed.iter().copied().collect(),
            name: session.user.name.clone(),
            total_time_seconds: session.user.total_time_seconds,
        },
        levels,
        lesson,
        quiz: session.quiz.as_ref().map(to_quiz_out),
        achievement: session.notifier.visible(),
        certificate_ready: session.certificate_ready,
    }
}

fn to_quiz_out(quiz: &QuizSession) -> QuizOut {
    let question = quiz.current_question().map(|q| QuestionOut {
        id: q.id.clone(),
        question: q.question.clone(),
        options: q.options.clone(),
    });
    let reveal = match (quiz.phase, quiz.current_question(), quiz.selected) {
        (QuizPhase::AnswerRevealed, Some(q), Some(selected)) => Some(RevealOut {
            selected_index: selected,
            correct: selected == q.correct_answer_index,
            correct_answer_index: q.correct_answer_index,
            explanation: q.explanation.clone(),
        }),
        _ => None,
    };
    QuizOut {
        level_id: quiz.level_id,
        phase: quiz.phase,
        current_index: quiz.current,
        total: quiz.total(),
        score: quiz.score,
        question,
        reveal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_levels;
    use crate::progress::LessonAdvance;

    fn catalog() -> Catalog {
        Catalog::new(builtin_levels()).expect("catalog")
    }

    #[test]
    fn snapshot_marks_level_access() {
        let catalog = catalog();
        let mut s = PlayerSession::new("s1".into(), None);
        s.complete_level(&catalog, 1, 1, 1);
        let out = to_session_out(&s, &catalog);
        assert!(matches!(out.levels[0].access, LevelAccess::Completed));
        assert!(matches!(out.levels[1].access, LevelAccess::Unlocked));
        assert!(matches!(out.levels[2].access, LevelAccess::Locked));
    }

    #[test]
    fn active_question_does_not_leak_the_correct_index() {
        let catalog = catalog();
        let mut s = PlayerSession::new("s1".into(), None);
        s.select_level(&catalog, 1);
        let parts = catalog.get(1).expect("level").lessons.len();
        let mut started = None;
        for _ in 0..parts {
            started = Some(s.advance_lesson(&catalog));
        }
        let attempt = match started {
            Some(LessonAdvance::QuizStarted { attempt, .. }) => attempt,
            other => panic!("expected quiz start, got {other:?}"),
        };
        s.quiz.as_mut().expect("quiz").install_dynamic(&attempt, vec![]);

        let out = to_session_out(&s, &catalog);
        let quiz = out.quiz.expect("quiz view");
        assert_eq!(quiz.phase, QuizPhase::QuestionActive);
        assert!(quiz.question.is_some());
        assert!(quiz.reveal.is_none());
        let rendered = serde_json::to_string(&quiz).expect("json");
        assert!(!rendered.contains("correctAnswerIndex"));

        s.quiz.as_mut().expect("quiz").select_answer(0);
        let out = to_session_out(&s, &catalog);
        let quiz = out.quiz.expect("quiz view");
        assert!(quiz.reveal.is_some());
    }
}
