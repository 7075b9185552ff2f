use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing message")]
    MissingMessage,

    #[error("Request body must include 'newPrompt'")]
    MissingPrompt,

    #[error("Prompt file not found")]
    PromptNotFound,

    #[error("Error reading prompt file: {0}")]
    PromptRead(std::io::Error),

    #[error("Error updating prompt file: {0}")]
    PromptWrite(std::io::Error),

    #[error("Failed to fetch data: {0}")]
    FetchError(String),

    #[error("Completion API error: {0}")]
    CompletionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The chat endpoint answers {error, details?}, the prompt admin
        // endpoints answer {success, message, error?}.
        let (status, body) = match self {
            AppError::MissingMessage => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Missing message" }),
            ),
            AppError::MissingPrompt => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "message": "Request body must include 'newPrompt'",
                }),
            ),
            AppError::PromptNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": "Prompt file not found" }),
            ),
            AppError::PromptRead(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "success": false,
                    "message": "Error reading prompt file",
                    "error": err.to_string(),
                }),
            ),
            AppError::PromptWrite(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "success": false,
                    "message": "Error updating prompt file",
                    "error": err.to_string(),
                }),
            ),
            AppError::FetchError(msg)
            | AppError::CompletionError(msg)
            | AppError::ConfigError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Something went wrong.", "details": msg }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchError(err.to_string())
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
