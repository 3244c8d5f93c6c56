//! AiAnalyzer implementation.

use brief_core::{async_trait, AnalysisRequest, Analyzer, AnalyzerError, InsightPrompt};
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::AiAnalyzerConfig;
use crate::prompt::build_messages;

/// An analyzer that asks a chat completions API for the narrative.
pub struct AiAnalyzer {
    client: Client,
    config: AiAnalyzerConfig,
}

impl AiAnalyzer {
    /// Create a new AiAnalyzer with the given configuration.
    pub fn new(config: AiAnalyzerConfig) -> Result<Self, AnalyzerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AnalyzerError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        info!(model = %config.model, api_url = %config.api_url, "AiAnalyzer initialized");

        Ok(Self { client, config })
    }

    /// Create an AiAnalyzer from environment variables.
    ///
    /// See [`AiAnalyzerConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, AnalyzerError> {
        Self::new(AiAnalyzerConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &AiAnalyzerConfig {
        &self.config
    }

    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatCompletionResponse, AnalyzerError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.api_url.trim_end_matches('/')
        );

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzerError::Timeout
                } else {
                    AnalyzerError::Network(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(AnalyzerError::ProcessingFailed(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(AnalyzerError::ProcessingFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AnalyzerError::ProcessingFailed(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl Analyzer for AiAnalyzer {
    #[instrument(skip(self, request), fields(program = request.program_code))]
    async fn analyze(
        &self,
        request: &AnalysisRequest<'_>,
        prompt: InsightPrompt,
    ) -> Result<String, AnalyzerError> {
        let completion = self.chat_completion(build_messages(request, prompt)).await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        // An empty answer is an error so a fallback analyzer can take over.
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AnalyzerError::ProcessingFailed("No content in response".to_string()))
    }

    fn name(&self) -> &str {
        "AiAnalyzer"
    }
}
