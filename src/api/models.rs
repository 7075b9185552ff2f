use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::RecommendedLink;
use crate::llm::ChatMessage;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    /// Replayed client-side history. Accepted as raw values so one junk
    /// entry cannot reject the whole request; filtered in `history_turns`.
    #[serde(default)]
    pub chat_history: Option<Vec<Value>>,
}

impl ChatRequest {
    /// The history entries worth forwarding: objects with a `user` or
    /// `assistant` role and non-empty string content. Everything else is
    /// dropped silently, including attempted `system` turns.
    pub fn history_turns(&self) -> Vec<ChatMessage> {
        self.chat_history
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| {
                let role = entry["role"].as_str()?;
                let content = entry["content"].as_str()?;
                if !matches!(role, "user" | "assistant") || content.is_empty() {
                    return None;
                }
                Some(ChatMessage {
                    role: role.to_string(),
                    content: content.to_string(),
                })
            })
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    pub links: Vec<RecommendedLink>,
    pub is_contact_form: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptUpdateRequest {
    #[serde(default)]
    pub new_prompt: Option<String>,
}

#[derive(Serialize)]
pub struct PromptReadResponse {
    pub success: bool,
    pub prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptUpdateResponse {
    pub success: bool,
    pub message: String,
    pub new_prompt: String,
}
