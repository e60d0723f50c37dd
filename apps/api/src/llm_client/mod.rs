/// LLM Client: the single point of entry for all model calls in the coaching service.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// The session talks to the model only through the `ChatModel` trait.
///
/// Model: claude-sonnet-4-5 (fixed)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::transcript::{Transcript, TranscriptEntry};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for every coaching call.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("ANTHROPIC_API_KEY is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result of one exchange: the reply text (if the model produced any) and the
/// complete conversation history including this exchange.
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub text: Option<String>,
    pub history: Transcript,
}

/// The conversational model seam. Implement this to swap providers (or to
/// script replies in tests) without touching the session.
///
/// `preamble` is the conversation-level instruction; implementations send it
/// out of band, never as part of `message`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn send_turn(
        &self,
        history: &Transcript,
        preamble: &str,
        message: &str,
    ) -> Result<TurnReply, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage>,
}

/// Wire shape of a conversation message. Transcript entries are stored in
/// exactly this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Concatenates every text block. `None` when the model produced no text.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Anthropic Messages API client used by the coaching session.
///
/// One HTTP attempt per call: a failed exchange is reported to the caller and
/// the user decides whether to try again.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
}

impl LlmClient {
    /// A missing key is accepted here; every call then fails with
    /// `LlmError::MissingApiKey` so the session can surface it.
    pub fn new(api_key: Option<String>) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Makes a raw call to the Messages API with the given conversation.
    async fn call(
        &self,
        messages: Vec<AnthropicMessage>,
        system: &str,
    ) -> Result<LlmResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn send_turn(
        &self,
        history: &Transcript,
        preamble: &str,
        message: &str,
    ) -> Result<TurnReply, LlmError> {
        let mut messages = history
            .entries()
            .iter()
            .map(|entry| serde_json::from_value::<AnthropicMessage>(entry.0.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        messages.push(AnthropicMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });

        let response = self.call(messages, preamble).await?;
        let text = response.text();

        Ok(TurnReply {
            history: extend_history(history, message, text.as_deref()),
            text,
        })
    }
}

/// Builds the post-exchange history: prior entries, the user message, and the
/// assistant reply when there was one.
fn extend_history(history: &Transcript, message: &str, reply: Option<&str>) -> Transcript {
    let mut entries = history.entries().to_vec();
    entries.push(TranscriptEntry(json!({ "role": "user", "content": message })));
    if let Some(reply) = reply {
        entries.push(TranscriptEntry(
            json!({ "role": "assistant", "content": reply }),
        ));
    }
    Transcript::from(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_joins_text_blocks() {
        let response: LlmResponse = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "Tell me about "},
                {"type": "tool_use"},
                {"type": "text", "text": "a conflict."}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("Tell me about a conflict."));
    }

    #[test]
    fn test_response_text_blank_is_none() {
        let response: LlmResponse = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "  "}],
            "usage": {"input_tokens": 1, "output_tokens": 0}
        }))
        .unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_extend_history_appends_exchange() {
        let history = extend_history(&Transcript::new(), "prep please", Some("{}"));
        let extended = extend_history(&history, "question please", Some("Why us?"));
        assert_eq!(extended.len(), 4);
        assert_eq!(extended.entries()[2].0["role"], "user");
        assert_eq!(extended.entries()[3].0["content"], "Why us?");
        // the input is left untouched
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_extend_history_without_reply_records_only_user_turn() {
        let extended = extend_history(&Transcript::new(), "question please", None);
        assert_eq!(extended.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_request() {
        let client = LlmClient::new(None).unwrap();
        assert!(!client.has_api_key());
        let err = client
            .send_turn(&Transcript::new(), "system", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let client = LlmClient::new(Some("  ".to_string())).unwrap();
        assert!(!client.has_api_key());
    }
}
