//! Minimal OpenAI client for our two proxy use-cases: the mentor chat and
//! JSON-mode challenge-question generation.
//!
//! Calls are instrumented and log model names, latencies, and response sizes
//! (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::Prompts;
use crate::domain::{ChatMessage, ChatRole, QuizQuestion};
use crate::util::fill_template;

/// Only the most recent history entries are forwarded upstream.
pub const CHAT_HISTORY_LIMIT: usize = 12;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub chat_model: String,
  pub questions_model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let chat_model =
      std::env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let questions_model =
      std::env::var("OPENAI_QUESTIONS_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, chat_model, questions_model })
  }

  /// Single chat-completion round trip returning the raw assistant text.
  #[instrument(level = "info", skip(self, messages, response_format), fields(model = %model, messages = messages.len()))]
  async fn complete(
    &self,
    model: &str,
    messages: Vec<ChatMessageReq>,
    response_format: Option<ResponseFormat>,
  ) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest { model: model.to_string(), messages, response_format };

    let res = self.client.post(&url)
      .header(USER_AGENT, "academy-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or_else(|| body);
      return Err(format!("OpenAI HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.get(0)
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();

    Ok(text)
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user), fields(model = %model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    model: &str,
    system: &str,
    user: &str,
  ) -> Result<T, String> {
    let messages = vec![
      ChatMessageReq { role: "system".into(), content: system.into() },
      ChatMessageReq { role: "user".into(), content: user.into() },
    ];
    let text = self
      .complete(model, messages, Some(ResponseFormat { r#type: "json_object".into() }))
      .await?;
    serde_json::from_str::<T>(&text).map_err(|e| format!("JSON parse error: {}", e))
  }

  // --- High-level helpers (domain-specialized) ---

  /// Mentor chat reply: fixed persona system prompt, capped history with
  /// `"model"` mapped to `"assistant"`, then the new user message.
  #[instrument(level = "info", skip(self, prompts, history, user_message), fields(model = %self.chat_model, history = history.len(), msg_len = user_message.len()))]
  pub async fn mentor_reply(
    &self,
    prompts: &Prompts,
    history: &[ChatMessage],
    user_message: &str,
  ) -> Result<String, String> {
    let messages = build_mentor_messages(&prompts.mentor_system, history, user_message);
    let start = std::time::Instant::now();
    let result = self.complete(&self.chat_model, messages, None).await;
    let elapsed = start.elapsed();

    match &result {
      Ok(text) => info!(?elapsed, reply_len = text.len(), "Mentor reply received"),
      Err(e) => error!(?elapsed, error = %e, "Mentor reply failed"),
    }
    result
  }

  /// Generate situation→decision challenge questions for a lesson context.
  /// Malformed items are dropped, ids are re-minted; the caller treats an
  /// error identically to an empty list.
  #[instrument(level = "info", skip(self, prompts, lesson_context), fields(model = %self.questions_model, ctx_len = lesson_context.len()))]
  pub async fn generate_challenge_questions(
    &self,
    prompts: &Prompts,
    lesson_context: &str,
  ) -> Result<Vec<QuizQuestion>, String> {
    let user = fill_template(
      &prompts.questions_user_template,
      &[("lesson_context", lesson_context)],
    );
    let batch: GenBatch = self
      .chat_json(&self.questions_model, &prompts.questions_system, &user)
      .await?;

    let received = batch.questions.len();
    let questions = sanitize_generated_questions(batch.questions);
    info!(received, kept = questions.len(), "Challenge questions generated");
    Ok(questions)
  }
}

/// Build the upstream message list: system persona first, then the last
/// `CHAT_HISTORY_LIMIT` transcript entries, then the fresh user message.
fn build_mentor_messages(
  system: &str,
  history: &[ChatMessage],
  user_message: &str,
) -> Vec<ChatMessageReq> {
  let mut messages = vec![ChatMessageReq { role: "system".into(), content: system.into() }];
  let skip = history.len().saturating_sub(CHAT_HISTORY_LIMIT);
  for m in &history[skip..] {
    let role = match m.role {
      ChatRole::Model => "assistant",
      ChatRole::User => "user",
    };
    messages.push(ChatMessageReq { role: role.into(), content: m.text.clone() });
  }
  messages.push(ChatMessageReq { role: "user".into(), content: user_message.into() });
  messages
}

/// Untrusted question shape as the model returns it. The model's `id` field
/// is deliberately not read; accepted items get fresh uuids.
#[derive(Deserialize)]
struct GenBatch {
  #[serde(default)]
  questions: Vec<GenQuestion>,
}

#[derive(Deserialize)]
struct GenQuestion {
  #[serde(default)]
  question: String,
  #[serde(default)]
  options: Vec<String>,
  #[serde(default = "neg_one", rename = "correctAnswerIndex")]
  correct_answer_index: i64,
  #[serde(default)]
  explanation: String,
}

fn neg_one() -> i64 {
  -1
}

/// Validate the external shape (4 non-empty options, correct index in range,
/// non-empty text) and re-mint ids. Malformed entries are dropped, never an
/// error: an out-of-range correct index drops the single item.
fn sanitize_generated_questions(raw: Vec<GenQuestion>) -> Vec<QuizQuestion> {
  raw
    .into_iter()
    .filter_map(|g| {
      let index = usize::try_from(g.correct_answer_index).ok()?;
      let q = QuizQuestion {
        id: Uuid::new_v4().to_string(),
        question: g.question,
        options: g.options,
        correct_answer_index: index,
        explanation: g.explanation,
      };
      q.is_well_formed().then_some(q)
    })
    .collect()
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
