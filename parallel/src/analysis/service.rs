use crate::error::{ParallelError, Result};
use crate::llm::{CompletionOptions, LlmProvider, UserContent};
use crate::models::{AnalysisResult, ResponseMode, SafetyCheckResult};

use super::prompts;

/// Server side of the analysis endpoints: prompt assembly plus one model
/// call per operation.
#[derive(Debug, Clone)]
pub struct AnalysisService {
    llm: LlmProvider,
}

impl AnalysisService {
    pub fn new(llm: LlmProvider) -> Self {
        Self { llm }
    }

    pub fn llm(&self) -> &LlmProvider {
        &self.llm
    }

    pub async fn analyze(
        &self,
        message: &str,
        mode: ResponseMode,
        decree_context: Option<&str>,
        plan_context: Option<&str>,
    ) -> Result<AnalysisResult> {
        let system_prompt = prompts::analysis_system_prompt(mode, decree_context, plan_context);
        let options = CompletionOptions::with_temperature(prompts::ANALYSIS_TEMPERATURE);

        let result: AnalysisResult = self
            .llm
            .complete_structured(
                &system_prompt,
                UserContent::Text(message),
                &prompts::analysis_schema(),
                Some(&options),
            )
            .await?;

        tracing::info!(
            mode = %mode,
            message_len = message.len(),
            classification = result.classification.as_str(),
            action = result.recommended_action.as_str(),
            tags = result.manipulation_tags.len(),
            "Message analyzed"
        );
        for violation in result.contract_violations() {
            tracing::warn!(violation, "Classifier broke its response contract");
        }

        Ok(result)
    }

    pub async fn check_safety(&self, draft: &str) -> Result<SafetyCheckResult> {
        let options = CompletionOptions::with_temperature(prompts::SAFETY_CHECK_TEMPERATURE);

        let result: SafetyCheckResult = self
            .llm
            .complete_structured(
                prompts::SAFETY_CHECK_SYSTEM_PROMPT,
                UserContent::Text(draft),
                &prompts::safety_check_schema(),
                Some(&options),
            )
            .await?;

        tracing::info!(
            draft_len = draft.len(),
            is_safe = result.is_safe,
            flagged = result.emotional_words.len(),
            "Draft tone checked"
        );

        Ok(result)
    }

    /// Returns an empty string when the model finds no text.
    pub async fn extract_document_text(&self, base64_data: &str, mime_type: &str) -> Result<String> {
        let content = UserContent::InlineData {
            mime_type,
            base64_data,
            instruction: prompts::EXTRACTION_INSTRUCTION,
        };

        match self
            .llm
            .complete(prompts::EXTRACTION_SYSTEM_PROMPT, content, None)
            .await
        {
            Ok(text) => {
                tracing::info!(mime_type, text_len = text.len(), "Document text extracted");
                Ok(text)
            }
            Err(ParallelError::EmptyResponse) => {
                tracing::info!(mime_type, "Document contained no readable text");
                Ok(String::new())
            }
            Err(e) => Err(e),
        }
    }
}
