use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::api::extractors::AppJson;
use crate::api::state::ApiState;
use crate::error::{ParallelError, Result};
use crate::models::{
    AnalysisResult, AnalyzeRequest, ExtractDocumentRequest, ExtractedText, ResponseMode,
    SafetyCheckRequest, SafetyCheckResult,
};

pub const ANALYZE_FAILED: &str = "Failed to analyze message. Please try again.";
pub const SAFETY_CHECK_FAILED: &str = "Failed to check draft safety.";
pub const EXTRACTION_FAILED: &str = "Failed to extract text from document.";

/// Blank strings count as missing.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Keeps validation, configuration and empty-payload errors as they are;
/// any other failure becomes the operation's retry message.
fn remote_failure(error: ParallelError, message: &'static str) -> ParallelError {
    match error {
        ParallelError::Validation(_)
        | ParallelError::Configuration(_)
        | ParallelError::EmptyResponse => error,
        other => {
            tracing::error!(error = %other, "{message}");
            ParallelError::Request(message.to_string())
        }
    }
}

/// `POST /api/analyze`
pub async fn analyze(
    State(state): State<ApiState>,
    AppJson(req): AppJson<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>> {
    let (Some(message), Some(mode)) = (required(req.message), required(req.mode)) else {
        return Err(ParallelError::Validation(
            "Missing required fields: message, mode".to_string(),
        ));
    };
    let mode = ResponseMode::parse(&mode)
        .ok_or_else(|| ParallelError::Validation(format!("Invalid mode: {mode}")))?;

    state
        .analysis
        .analyze(
            &message,
            mode,
            req.decree_context.as_deref(),
            req.plan_context.as_deref(),
        )
        .await
        .map(Json)
        .map_err(|e| remote_failure(e, ANALYZE_FAILED))
}

/// `POST /api/safety-check`
pub async fn safety_check(
    State(state): State<ApiState>,
    AppJson(req): AppJson<SafetyCheckRequest>,
) -> Result<Json<SafetyCheckResult>> {
    let Some(draft) = required(req.draft) else {
        return Err(ParallelError::Validation(
            "Missing required field: draft".to_string(),
        ));
    };

    state
        .analysis
        .check_safety(&draft)
        .await
        .map(Json)
        .map_err(|e| remote_failure(e, SAFETY_CHECK_FAILED))
}

/// `POST /api/extract-document`
pub async fn extract_document(
    State(state): State<ApiState>,
    AppJson(req): AppJson<ExtractDocumentRequest>,
) -> Result<Json<ExtractedText>> {
    let (Some(base64_data), Some(mime_type)) = (required(req.base64_data), required(req.mime_type))
    else {
        return Err(ParallelError::Validation(
            "Missing required fields: base64Data, mimeType".to_string(),
        ));
    };

    state
        .analysis
        .extract_document_text(&base64_data, &mime_type)
        .await
        .map(|text| Json(ExtractedText { text }))
        .map_err(|e| remote_failure(e, EXTRACTION_FAILED))
}

/// Rewrites the body limit layer's plain-text 413 as `{"error": ...}`.
pub async fn payload_too_large_as_json(response: Response) -> Response {
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }
    tracing::warn!("Request body exceeded the configured limit");
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        Json(json!({ "error": "Request body too large" })),
    )
        .into_response()
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub llm: LlmStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmStatus {
    pub status: String,
    pub provider: String,
    pub model: String,
}

/// `GET /api/health`
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthData> {
    let llm = state.analysis.llm();
    let status = if llm.is_available() {
        "available"
    } else {
        "unconfigured"
    };

    Json(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm: LlmStatus {
            status: status.to_string(),
            provider: llm.backend().name().to_string(),
            model: llm.config().model.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_treats_blank_as_missing() {
        assert_eq!(required(None), None);
        assert_eq!(required(Some("  ".to_string())), None);
        assert_eq!(required(Some("hi".to_string())).as_deref(), Some("hi"));
    }

    #[test]
    fn remote_failure_hides_transport_detail() {
        let error = remote_failure(
            ParallelError::Llm("connection reset".to_string()),
            ANALYZE_FAILED,
        );
        assert!(matches!(error, ParallelError::Request(ref m) if m == ANALYZE_FAILED));
    }

    #[tokio::test]
    async fn oversized_body_response_becomes_json() {
        let response = (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded").into_response();

        let response = payload_too_large_as_json(response).await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Request body too large" }));
    }

    #[tokio::test]
    async fn other_responses_pass_through() {
        let response = payload_too_large_as_json(StatusCode::NO_CONTENT.into_response()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn remote_failure_keeps_configuration_errors() {
        let error = remote_failure(
            ParallelError::Configuration("no key".to_string()),
            SAFETY_CHECK_FAILED,
        );
        assert!(matches!(error, ParallelError::Configuration(_)));
    }
}
