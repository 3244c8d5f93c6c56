//! Configuration for AiAnalyzer.

use std::env;
use std::time::Duration;

use brief_core::AnalyzerError;
use secrecy::{ExposeSecret, SecretString};

/// Configuration for AiAnalyzer.
#[derive(Debug, Clone)]
pub struct AiAnalyzerConfig {
    /// API base URL (without `/v1/chat/completions`).
    pub api_url: String,

    /// API key for authentication.
    api_key: SecretString,

    /// Model name to use.
    pub model: String,

    /// Maximum tokens for response.
    pub max_tokens: Option<u32>,

    /// Temperature for generation (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Request timeout.
    pub timeout: Duration,
}

impl AiAnalyzerConfig {
    /// Default API base URL.
    pub const DEFAULT_API_URL: &'static str = "https://api.openai.com";
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    /// Create a configuration with an API key and defaults for everything else.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            api_key: SecretString::from(api_key.into()),
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: Some(600),
            temperature: Some(0.4),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `BRIEF_AI_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `BRIEF_AI_API_URL` - API URL (default: https://api.openai.com)
    /// - `BRIEF_AI_MODEL` - Model name (default: gpt-4o-mini)
    /// - `BRIEF_AI_MAX_TOKENS` - Max tokens (default: 600)
    /// - `BRIEF_AI_TEMPERATURE` - Temperature (default: 0.4)
    /// - `BRIEF_AI_TIMEOUT_SECS` - Request timeout (default: 30)
    pub fn from_env() -> Result<Self, AnalyzerError> {
        let api_key = env::var("BRIEF_AI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnalyzerError::Configuration("BRIEF_AI_API_KEY not set".to_string()))?;

        let mut config = Self::new(api_key);

        if let Ok(url) = env::var("BRIEF_AI_API_URL") {
            config.api_url = url;
        }
        if let Ok(model) = env::var("BRIEF_AI_MODEL") {
            config.model = model;
        }

        config.max_tokens = env::var("BRIEF_AI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(config.max_tokens);

        config.temperature = env::var("BRIEF_AI_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(config.temperature);

        if let Some(secs) = env::var("BRIEF_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Whether an API key is present in the environment.
    pub fn is_configured() -> bool {
        env::var("BRIEF_AI_API_KEY")
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }

    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Builder method to set the API URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Builder method to set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
