use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ParallelError, Result};
use crate::models::{
    AnalysisResult, AnalyzeRequest, ExtractDocumentRequest, ExtractedText, ResponseMode,
    SafetyCheckRequest, SafetyCheckResult,
};

use super::AnalysisGateway;

const ANALYZE_FALLBACK: &str = "Failed to analyze message. Please try again.";
const SAFETY_CHECK_FALLBACK: &str = "Failed to check draft safety.";
const EXTRACTION_FALLBACK: &str = "Failed to extract text from document.";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// [`AnalysisGateway`] over HTTP against a running `parallel serve`.
///
/// No client-side timeout is set; failure is decided by the transport or
/// the server's response.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B, fallback: &str) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let url = format!("{}/api/{endpoint}", self.base_url);

        let response = match self.client.post(&url).json(body).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "Gateway request failed");
                return Err(ParallelError::Request(fallback.to_string()));
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "Failed to read gateway response");
                return Err(ParallelError::Request(fallback.to_string()));
            }
        };

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.error)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string());
            tracing::warn!(endpoint, status = status.as_u16(), %message, "Gateway returned error");
            return Err(ParallelError::Request(message));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            tracing::warn!(endpoint, "Gateway returned an empty payload");
            return Err(ParallelError::Request(fallback.to_string()));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(endpoint, error = %e, "Gateway payload did not match contract");
            ParallelError::Request(fallback.to_string())
        })
    }
}

#[async_trait]
impl AnalysisGateway for HttpGateway {
    async fn analyze(
        &self,
        message: &str,
        mode: ResponseMode,
        decree_context: Option<&str>,
        plan_context: Option<&str>,
    ) -> Result<AnalysisResult> {
        let body = AnalyzeRequest {
            message: Some(message.to_string()),
            mode: Some(mode.as_str().to_string()),
            decree_context: decree_context.map(str::to_string),
            plan_context: plan_context.map(str::to_string),
        };
        self.post("analyze", &body, ANALYZE_FALLBACK).await
    }

    async fn check_safety(&self, draft: &str) -> Result<SafetyCheckResult> {
        let body = SafetyCheckRequest {
            draft: Some(draft.to_string()),
        };
        self.post("safety-check", &body, SAFETY_CHECK_FALLBACK).await
    }

    async fn extract_document_text(&self, base64_data: &str, mime_type: &str) -> Result<String> {
        let body = ExtractDocumentRequest {
            base64_data: Some(base64_data.to_string()),
            mime_type: Some(mime_type.to_string()),
        };
        let extracted: ExtractedText = self
            .post("extract-document", &body, EXTRACTION_FALLBACK)
            .await?;
        Ok(extracted.text)
    }
}
