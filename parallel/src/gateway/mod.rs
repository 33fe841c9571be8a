//! Client side of the analysis endpoints.

mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AnalysisResult, ResponseMode, SafetyCheckResult};

pub use http::HttpGateway;

/// One operation per use case. Every failure is a
/// [`ParallelError::Request`](crate::error::ParallelError::Request) carrying
/// a message fit for display; nothing is retried.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn analyze(
        &self,
        message: &str,
        mode: ResponseMode,
        decree_context: Option<&str>,
        plan_context: Option<&str>,
    ) -> Result<AnalysisResult>;

    async fn check_safety(&self, draft: &str) -> Result<SafetyCheckResult>;

    /// Empty string when the document has no readable text.
    async fn extract_document_text(&self, base64_data: &str, mime_type: &str) -> Result<String>;
}
