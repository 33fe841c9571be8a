use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{ParallelError, Result};
use crate::llm::api::LlmApiClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    Gemini,
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

impl LlmBackend {
    pub fn name(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "gemini",
            LlmBackend::OpenAI => "openai",
            LlmBackend::OpenRouter => "openrouter",
            LlmBackend::Ollama => "ollama",
            LlmBackend::LmStudio => "lmstudio",
            LlmBackend::OpenAICompatible { .. } => "openai-compatible",
            LlmBackend::Unavailable { .. } => "unavailable",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..Default::default()
        }
    }
}

/// User turn of a completion request.
#[derive(Debug, Clone, Copy)]
pub enum UserContent<'a> {
    Text(&'a str),
    /// A base64 document (image or PDF) followed by a text instruction.
    InlineData {
        mime_type: &'a str,
        base64_data: &'a str,
        instruction: &'a str,
    },
}

/// JSON schema the model's reply must follow.
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub schema: Value,
}

#[derive(Debug, Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    config: Arc<LlmConfig>,
    client: Option<LlmApiClient>,
}

impl LlmProvider {
    pub fn new(config: &LlmConfig) -> Self {
        let (provider, _model) = parse_llm_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "gemini" => LlmBackend::Gemini,
            "openai" => LlmBackend::OpenAI,
            "openrouter" => LlmBackend::OpenRouter,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            _ => {
                if let Some(base_url) = &config.base_url {
                    LlmBackend::OpenAICompatible {
                        base_url: base_url.clone(),
                    }
                } else {
                    LlmBackend::Unavailable {
                        reason: format!("Unknown provider in model: {}", config.model),
                    }
                }
            }
        };

        let client = match backend {
            LlmBackend::Unavailable { .. } => None,
            _ => match LlmApiClient::new(config) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!(error = %e, "LLM client not created");
                    None
                }
            },
        };

        Self {
            backend,
            config: Arc::new(config.clone()),
            client,
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn base_url(&self) -> Option<&str> {
        self.client.as_ref().map(|client| client.base_url())
    }

    pub async fn complete(
        &self,
        system_prompt: &str,
        content: UserContent<'_>,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        let client = self.client()?;
        client.complete(system_prompt, content, None, options).await
    }

    /// Completes under a response schema and decodes the reply into `T`.
    pub async fn complete_structured<T: DeserializeOwned>(
        &self,
        system_prompt: &str,
        content: UserContent<'_>,
        schema: &ResponseSchema,
        options: Option<&CompletionOptions>,
    ) -> Result<T> {
        let client = self.client()?;
        let text = client
            .complete(system_prompt, content, Some(schema), options)
            .await?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                response_len = text.len(),
                schema = schema.name,
                error = %e,
                "Failed to parse structured response"
            );
            ParallelError::Llm(format!("Failed to deserialize response: {e}"))
        })
    }

    fn client(&self) -> Result<&LlmApiClient> {
        match (&self.client, &self.backend) {
            (Some(client), _) => Ok(client),
            (None, LlmBackend::Unavailable { reason }) => {
                Err(ParallelError::Configuration(reason.clone()))
            }
            (None, _) => Err(ParallelError::Configuration(
                "LLM credential is not configured".to_string(),
            )),
        }
    }
}
