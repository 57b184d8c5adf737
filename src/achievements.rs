//! Achievement detection and the one-at-a-time toast queue.
//!
//! Rules are stateless predicates over the user state, evaluated after every
//! mutation; each id fires at most once per session. Newly satisfied ids are
//! queued FIFO and surfaced one toast at a time, auto-dismissed after
//! `TOAST_TICKS` seconds or on explicit dismissal.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::progress::UserState;

/// How many time ticks a toast stays visible without user action.
pub const TOAST_TICKS: u8 = 7;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct AchievementDef {
  pub id: &'static str,
  pub title: &'static str,
  pub description: &'static str,
  pub icon: &'static str,
}

/// All achievements, in detection order.
pub static ACHIEVEMENTS: &[AchievementDef] = &[
  AchievementDef {
    id: "first_steps",
    title: "Первые шаги",
    description: "Заработай свой первый опыт",
    icon: "🚀",
  },
  AchievementDef {
    id: "level_3",
    title: "Восходящая звезда",
    description: "Достигни 3 уровня",
    icon: "⭐",
  },
  AchievementDef {
    id: "level_5",
    title: "Ветеран сети",
    description: "Достигни 5 уровня",
    icon: "🛡️",
  },
  AchievementDef {
    id: "quiz_master",
    title: "Мастер квизов",
    description: "Набери первые баллы за квиз",
    icon: "🧠",
  },
  AchievementDef {
    id: "completion",
    title: "Легенда Web3",
    description: "Пройди все уровни академии",
    icon: "👑",
  },
];

pub fn achievement_by_id(id: &str) -> Option<&'static AchievementDef> {
  ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Monotonic trigger conditions: once true for a session, they stay true.
fn satisfied(id: &str, user: &UserState, total_levels: usize) -> bool {
  match id {
    "first_steps" => user.xp > 0,
    "level_3" => user.level() >= 3,
    "level_5" => user.level() >= 5,
    "quiz_master" => user.score > 0,
    "completion" => user.completed_level_ids.len() >= total_levels,
    _ => false,
  }
}

#[derive(Clone, Debug)]
struct Toast {
  id: &'static str,
  remaining: u8,
}

/// Per-session observer over user-state transitions.
#[derive(Clone, Debug, Default)]
pub struct AchievementNotifier {
  fired: HashSet<&'static str>,
  queue: VecDeque<&'static str>,
  visible: Option<Toast>,
}

impl AchievementNotifier {
  pub fn new() -> Self {
    Self::default()
  }

  /// Evaluate every rule against the new state; enqueue newly satisfied,
  /// never-fired ids in table order.
  pub fn observe(&mut self, user: &UserState, total_levels: usize) {
    for def in ACHIEVEMENTS {
      if !self.fired.contains(def.id) && satisfied(def.id, user, total_levels) {
        self.fired.insert(def.id);
        self.queue.push_back(def.id);
      }
    }
    self.promote();
  }

  /// One time tick: count the visible toast down, then surface the next
  /// queued one.
  pub fn tick(&mut self) {
    if let Some(toast) = &mut self.visible {
      toast.remaining = toast.remaining.saturating_sub(1);
      if toast.remaining == 0 {
        self.visible = None;
      }
    }
    self.promote();
  }

  /// Explicit user dismissal of the visible toast.
  pub fn dismiss(&mut self) {
    self.visible = None;
    self.promote();
  }

  pub fn visible(&self) -> Option<&'static AchievementDef> {
    self.visible.as_ref().and_then(|t| achievement_by_id(t.id))
  }

  fn promote(&mut self) {
    if self.visible.is_none() {
      if let Some(id) = self.queue.pop_front() {
        self.visible = Some(Toast { id, remaining: TOAST_TICKS });
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(xp: u32, score: u32, completed: &[u32]) -> UserState {
    let mut u = UserState::new("Cadet".into());
    u.xp = xp;
    u.score = score;
    u.completed_level_ids = completed.iter().copied().collect();
    u
  }

  #[test]
  fn first_xp_fires_first_steps() {
    let mut n = AchievementNotifier::new();
    n.observe(&user(0, 0, &[]), 8);
    assert!(n.visible().is_none());
    n.observe(&user(60, 0, &[]), 8);
    assert_eq!(n.visible().expect("toast").id, "first_steps");
  }

  #[test]
  fn achievements_fire_at_most_once() {
    let mut n = AchievementNotifier::new();
    n.observe(&user(1100, 0, &[]), 8);
    assert_eq!(n.visible().expect("toast").id, "first_steps");
    n.dismiss();
    assert_eq!(n.visible().expect("toast").id, "level_3");
    n.dismiss();
    assert!(n.visible().is_none());
    // Level recomputed at 3 again later: nothing new fires.
    n.observe(&user(1300, 0, &[]), 8);
    assert!(n.visible().is_none());
  }

  #[test]
  fn queue_is_fifo_one_toast_at_a_time() {
    let mut n = AchievementNotifier::new();
    n.observe(&user(2100, 700, &[]), 8);
    // first_steps, level_3, level_5, quiz_master satisfied simultaneously.
    for expected in ["first_steps", "level_3", "level_5", "quiz_master"] {
      assert_eq!(n.visible().expect("toast").id, expected);
      n.dismiss();
    }
    assert!(n.visible().is_none());
  }

  #[test]
  fn toast_auto_dismisses_after_seven_ticks() {
    let mut n = AchievementNotifier::new();
    n.observe(&user(10, 0, &[]), 8);
    for _ in 0..(TOAST_TICKS - 1) {
      n.tick();
      assert!(n.visible().is_some());
    }
    n.tick();
    assert!(n.visible().is_none());
  }

  #[test]
  fn auto_dismiss_promotes_the_next_queued_toast() {
    let mut n = AchievementNotifier::new();
    n.observe(&user(10, 10, &[]), 8);
    assert_eq!(n.visible().expect("toast").id, "first_steps");
    for _ in 0..TOAST_TICKS {
      n.tick();
    }
    assert_eq!(n.visible().expect("toast").id, "quiz_master");
  }

  #[test]
  fn completion_requires_every_level() {
    let mut n = AchievementNotifier::new();
    n.observe(&user(10, 10, &[1, 2, 3, 4, 5, 6, 7]), 8);
    n.dismiss();
    n.dismiss();
    assert!(n.visible().is_none());
    n.observe(&user(10, 10, &[1, 2, 3, 4, 5, 6, 7, 8]), 8);
    assert_eq!(n.visible().expect("toast").id, "completion");
  }
}
