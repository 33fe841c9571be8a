use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::ParallelError;

/// `axum::Json` whose rejections render as `{"error": ...}` like every other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ParallelError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for ParallelError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> ParallelError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            ParallelError::Validation(format!("Invalid JSON: {}", err.body_text()))
        }
        JsonRejection::JsonSyntaxError(err) => {
            ParallelError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => ParallelError::Validation(
            "Missing `Content-Type: application/json` header".to_string(),
        ),
        JsonRejection::BytesRejection(err) => {
            ParallelError::Validation(format!("Failed to read request body: {}", err.body_text()))
        }
        _ => ParallelError::Validation(rejection.body_text()),
    }
}
