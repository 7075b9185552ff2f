use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State},
};
use tower_http::cors::{CorsLayer, Any};
use tracing::info;

use crate::error::{Result, AppError};
use crate::api::models::{
    ChatRequest, ChatResponse, PromptReadResponse, PromptUpdateRequest, PromptUpdateResponse,
};
use crate::extract::extract_structured_output;
use crate::llm::{request_completion, ChatMessage};
use crate::prompt::{render_system_prompt, resolve_target_language};
use crate::site_context::fetch_site_context;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/api/chat", post(chat_handler))
        .route("/api/prompt", get(read_prompt_handler).post(update_prompt_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn health_check() -> &'static str {
    "Backend is running successfully!"
}

/// One chat turn: optional site context, prompt assembly from the current
/// cache snapshot, completion call, structured-output extraction.
async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let message = req
        .message
        .as_deref()
        .filter(|message| !message.is_empty())
        .ok_or(AppError::MissingMessage)?;

    let target_language = resolve_target_language(req.language.as_deref());
    info!(language = %target_language, "incoming chat message");

    // Site context is best-effort: any failure inside yields "".
    let site_content = match req.website_url.as_deref() {
        Some(website_url) => fetch_site_context(&state.http, website_url).await,
        None => String::new(),
    };

    let snapshot = state.cache.snapshot();
    let template = state.prompts.load_or_default().await;
    let system_prompt = render_system_prompt(
        &template,
        &target_language,
        &snapshot.pages,
        &snapshot.posts,
    );

    let mut messages = vec![ChatMessage::system(system_prompt)];
    messages.extend(req.history_turns());
    messages.push(ChatMessage::user(format!("{}\n\n{}", message, site_content)));

    let reply = request_completion(&state.http, &state.config.openai_api_key, messages).await?;

    let structured = extract_structured_output(&reply);
    Ok(Json(ChatResponse {
        reply,
        links: structured.links,
        is_contact_form: structured.details_required,
    }))
}

async fn read_prompt_handler(
    State(state): State<AppState>,
) -> Result<Json<PromptReadResponse>> {
    let prompt = state.prompts.read().await?;
    Ok(Json(PromptReadResponse {
        success: true,
        prompt,
    }))
}

async fn update_prompt_handler(
    State(state): State<AppState>,
    Json(req): Json<PromptUpdateRequest>,
) -> Result<Json<PromptUpdateResponse>> {
    let new_prompt = req
        .new_prompt
        .filter(|prompt| !prompt.is_empty())
        .ok_or(AppError::MissingPrompt)?;

    state.prompts.write(&new_prompt).await?;
    info!("prompt file updated");

    Ok(Json(PromptUpdateResponse {
        success: true,
        message: "Prompt file updated successfully".to_string(),
        new_prompt,
    }))
}
