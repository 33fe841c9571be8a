use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParallelError {
    #[error("{0}")]
    Validation(String),

    #[error("Server configuration error: {0}")]
    Configuration(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Empty response from AI")]
    EmptyResponse,

    /// A gateway call failed; the message is safe to show to the user.
    #[error("{0}")]
    Request(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ParallelError {
    pub fn status(&self) -> StatusCode {
        match self {
            ParallelError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ParallelError {
    fn into_response(self) -> Response {
        let message = match &self {
            ParallelError::Validation(msg) => msg.clone(),
            ParallelError::Configuration(detail) => {
                tracing::error!(detail = %detail, "Server configuration error");
                "Server configuration error".to_string()
            }
            ParallelError::EmptyResponse => self.to_string(),
            ParallelError::Request(msg) => msg.clone(),
            other => {
                tracing::error!(error = %other, "Request failed");
                "An internal error occurred".to_string()
            }
        };

        let body = Json(json!({ "error": message }));

        (self.status(), body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ParallelError>;
