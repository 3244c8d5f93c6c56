//! Fallback analyzer - tries a primary analyzer and uses a second on error.

use brief_core::{async_trait, AnalysisRequest, Analyzer, AnalyzerError, InsightPrompt};
use tracing::warn;

/// An analyzer that wraps a primary analyzer and a fallback.
///
/// Typically an AI-backed primary with a [`crate::RuleAnalyzer`] fallback, so a
/// brief is always produced even when the remote service is down.
pub struct FallbackAnalyzer<P: Analyzer, F: Analyzer> {
    primary: P,
    fallback: F,
}

impl<P: Analyzer, F: Analyzer> FallbackAnalyzer<P, F> {
    /// Create a new FallbackAnalyzer.
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: Analyzer, F: Analyzer> Analyzer for FallbackAnalyzer<P, F> {
    async fn analyze(
        &self,
        request: &AnalysisRequest<'_>,
        prompt: InsightPrompt,
    ) -> Result<String, AnalyzerError> {
        match self.primary.analyze(request, prompt).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(
                    analyzer = self.primary.name(),
                    program = request.program_code,
                    error = %e,
                    "Primary analyzer failed, using {}",
                    self.fallback.name()
                );
                self.fallback.analyze(request, prompt).await
            }
        }
    }

    fn name(&self) -> &str {
        "FallbackAnalyzer"
    }
}
