use serde::Serialize;
use reqwest::Client;
use serde_json::Value;
use crate::error::{Result, AppError};

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const COMPLETION_MODEL: &str = "gpt-4o-mini";
const MAX_COMPLETION_TOKENS: u32 = 600;

/// Stand-in reply when the API answers without any usable text.
pub const EMPTY_REPLY: &str = "No response";

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

/// Send the assembled message list to the completion API and return the
/// first choice's text, trimmed. Missing or empty text becomes the fixed
/// `EMPTY_REPLY` placeholder; transport failures propagate to the caller.
pub async fn request_completion(
    client: &Client,
    api_key: &str,
    messages: Vec<ChatMessage>,
) -> Result<String> {
    let body = CompletionRequest {
        model: COMPLETION_MODEL.into(),
        messages,
        max_tokens: MAX_COMPLETION_TOKENS,
    };

    let response = client
        .post(COMPLETIONS_URL)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| AppError::CompletionError(e.to_string()))?;

    let json: Value = response
        .json()
        .await
        .map_err(|e| AppError::CompletionError(e.to_string()))?;

    Ok(reply_text(&json))
}

fn reply_text(json: &Value) -> String {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| EMPTY_REPLY.to_string())
}
