//! Application state: the level catalog, in-memory player sessions, the
//! OpenAI client, and prompt configuration.
//!
//! This module owns:
//!   - the validated course catalog (TOML bank or built-in course)
//!   - the session store (one `PlayerSession` per connected player)
//!   - the prompts struct (from TOML or defaults)
//!   - optional OpenAI client
//!
//! Sessions live only for the process lifetime; there is no persistence.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::catalog::{builtin_levels, Catalog};
use crate::config::{level_from_cfg, load_academy_config_from_env, Prompts};
use crate::openai::OpenAI;
use crate::progress::PlayerSession;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<RwLock<HashMap<String, PlayerSession>>>,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load config, validate the catalog, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        // Load TOML config if provided (prompts + optional level bank).
        let cfg_opt = load_academy_config_from_env();
        let prompts = cfg_opt
            .as_ref()
            .map(|c| c.prompts.clone())
            .unwrap_or_default();

        // A config-supplied catalog replaces the built-in course, but only
        // when it passes validation; otherwise fall back.
        let configured = cfg_opt
            .filter(|c| !c.levels.is_empty())
            .and_then(|c| {
                let levels: Vec<_> = c.levels.into_iter().map(level_from_cfg).collect();
                match Catalog::new(levels) {
                    Ok(catalog) => Some(catalog),
                    Err(e) => {
                        error!(target: "academy_backend", error = %e, "Config level bank rejected; using built-in course");
                        None
                    }
                }
            });
        let catalog = configured.unwrap_or_else(|| {
            Catalog::new(builtin_levels()).expect("built-in catalog must validate")
        });

        // Startup inventory summary.
        for level in catalog.levels() {
            info!(
                target: "progress",
                id = level.id,
                title = %level.title,
                lessons = level.lessons.len(),
                questions = level.quiz.len(),
                xp_reward = level.xp_reward,
                "Catalog level loaded"
            );
        }

        // Build optional OpenAI client (if API key present).
        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "academy_backend", base_url = %oa.base_url, chat_model = %oa.chat_model, questions_model = %oa.questions_model, "OpenAI enabled.");
        } else {
            info!(target: "academy_backend", "OpenAI disabled (no OPENAI_API_KEY). Proxies will answer with fallbacks.");
        }

        Self {
            catalog: Arc::new(catalog),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            openai,
            prompts,
        }
    }

    /// Mint an id and register a fresh player session.
    #[instrument(level = "info", skip(self, name))]
    pub async fn create_session(&self, name: Option<String>) -> PlayerSession {
        let id = Uuid::new_v4().to_string();
        let session = PlayerSession::new(id.clone(), name);
        info!(target: "progress", session = %id, player = %session.user.name, "Session created");
        self.sessions.write().await.insert(id, session.clone());
        session
    }

    /// Run a closure against one session under the write lock. Returns None
    /// for an unknown session id.
    pub async fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut PlayerSession, &Catalog) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        Some(f(session, &self.catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_session_then_access_it() {
        let state = AppState {
            catalog: Arc::new(Catalog::new(builtin_levels()).expect("catalog")),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            openai: None,
            prompts: Prompts::default(),
        };
        let session = state.create_session(Some("Нео".into())).await;
        let name = state
            .with_session(&session.id, |s, _| s.user.name.clone())
            .await
            .expect("session");
        assert_eq!(name, "Нео");
        assert!(state.with_session("missing", |_, _| ()).await.is_none());
    }

    #[tokio::test]
    async fn blank_name_falls_back_to_default() {
        let state = AppState {
            catalog: Arc::new(Catalog::new(builtin_levels()).expect("catalog")),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            openai: None,
            prompts: Prompts::default(),
        };
        let session = state.create_session(Some("   ".into())).await;
        let name = state
            .with_session(&session.id, |s, _| s.user.name.clone())
            .await
            .expect("session");
        assert_eq!(name, "Cadet");
    }
}
