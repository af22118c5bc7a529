//! Reply composition boundary.
//!
//! The hosted text-generation model is an external collaborator: the
//! router decides which tools run (see [`crate::router`]) and this module
//! only turns the utterance, truncated history, and tool results into one
//! natural-language reply. [`ChatModel`] is the seam:
//!
//! - **[`DisabledModel`]** — deterministic composition from the tool
//!   results themselves. Keeps the pipeline fully operable (and testable)
//!   with no hosted model configured.
//! - **[`GeminiModel`]** — calls the Gemini `generateContent` endpoint
//!   with a system instruction and the conversation, with the same
//!   retry/backoff behavior as the other remote clients.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::models::{ChatTurn, Role};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV_VAR: &str = "GOOGLE_API_KEY";

/// Everything the composer needs to produce one reply.
pub struct CompletionRequest<'a> {
    /// System instruction (persona and composition guidance).
    pub system: String,
    /// Truncated conversation history, oldest first.
    pub history: &'a [ChatTurn],
    /// The current user utterance.
    pub utterance: &'a str,
    /// Textual results of the tools the router invoked this turn.
    pub tool_results: &'a [String],
}

/// Trait for reply composition backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the model identifier (e.g. `"gemini-flash-latest"`).
    fn model_name(&self) -> &str;

    /// Compose the turn's single final reply.
    async fn complete(&self, request: CompletionRequest<'_>) -> anyhow::Result<String>;
}

/// Composition without a hosted model: the reply is the tool output.
///
/// Used when `llm.provider = "disabled"`. Tool results pass through
/// verbatim, so a detail lookup's reply contains the project file's full
/// text. The conversation-level tests pin this down.
pub struct DisabledModel;

#[async_trait]
impl ChatModel for DisabledModel {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> anyhow::Result<String> {
        if request.tool_results.is_empty() {
            return Ok(
                "No reply model is configured. Ask about the subject's background, \
                 projects, or repositories to get tool-backed answers."
                    .to_string(),
            );
        }
        Ok(request.tool_results.join("\n\n"))
    }
}

/// Reply composition via the Gemini `generateContent` API.
///
/// Requires the `GOOGLE_API_KEY` environment variable.
pub struct GeminiModel {
    model: String,
    api_key: String,
    timeout_secs: u64,
    max_retries: u32,
}

impl GeminiModel {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("llm.model required for Gemini provider"))?;
        let api_key = std::env::var(API_KEY_ENV_VAR)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", API_KEY_ENV_VAR))?;

        Ok(Self {
            model,
            api_key,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        })
    }

    /// Build the `generateContent` request body.
    ///
    /// History turns map to `user`/`model` contents; the current
    /// utterance and the tool results form the final `user` content, so
    /// the model composes from what the tools actually returned rather
    /// than choosing tools itself.
    fn request_body(&self, request: &CompletionRequest<'_>) -> serde_json::Value {
        let mut contents: Vec<serde_json::Value> = request
            .history
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                serde_json::json!({
                    "role": role,
                    "parts": [{ "text": turn.text }]
                })
            })
            .collect();

        let mut final_text = request.utterance.to_string();
        if !request.tool_results.is_empty() {
            final_text.push_str("\n\nTool results:\n");
            for result in request.tool_results {
                final_text.push_str(result);
                final_text.push('\n');
            }
        }
        contents.push(serde_json::json!({
            "role": "user",
            "parts": [{ "text": final_text }]
        }));

        serde_json::json!({
            "system_instruction": { "parts": [{ "text": request.system }] },
            "contents": contents,
            "generationConfig": { "temperature": 0 }
        })
    }
}

#[async_trait]
impl ChatModel for GeminiModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> anyhow::Result<String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?;

        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let body = self.request_body(&request);

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return extract_reply(&json);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err =
                            Some(anyhow::anyhow!("Gemini API error {}: {}", status, body_text));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    anyhow::bail!("Gemini API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("completion failed after retries")))
    }
}

/// Pull the reply text out of a `generateContent` response.
fn extract_reply(json: &serde_json::Value) -> anyhow::Result<String> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid Gemini response: missing candidates"))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        anyhow::bail!("Invalid Gemini response: empty reply");
    }
    Ok(text)
}

/// Create the appropriate [`ChatModel`] based on configuration.
pub fn create_model(config: &LlmConfig) -> anyhow::Result<Box<dyn ChatModel>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledModel)),
        "gemini" => Ok(Box::new(GeminiModel::new(config)?)),
        other => anyhow::bail!("Unknown llm provider: {}", other),
    }
}
