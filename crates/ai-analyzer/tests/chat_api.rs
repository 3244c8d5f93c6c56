//! AiAnalyzer against a mocked chat completions endpoint.

use std::time::Duration;

use ai_analyzer::{AiAnalyzer, AiAnalyzerConfig};
use brief_core::{AnalysisRequest, Analyzer, AnalyzerError, InsightPrompt};
use chrono::NaiveDate;
use rule_analyzer::{FallbackAnalyzer, RuleAnalyzer};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> AnalysisRequest<'static> {
    AnalysisRequest {
        program_code: "sewp",
        program_name: "NASA SEWP V",
        keywords: &[],
        news: &[],
        new_opportunities: &[],
        closing_soon: &[],
        today: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
    }
}

fn analyzer(server: &MockServer) -> AiAnalyzer {
    let config = AiAnalyzerConfig::new("test-key")
        .with_api_url(server.uri())
        .with_model("brief-model")
        .with_timeout(Duration::from_secs(5));
    AiAnalyzer::new(config).unwrap()
}

fn completion(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1,
        "model": "brief-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
}

#[tokio::test]
async fn test_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "model": "brief-model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(
            "  Year-end ordering is accelerating.  "
        ))))
        .expect(1)
        .mount(&server)
        .await;

    let text = analyzer(&server)
        .analyze(&request(), InsightPrompt::WhatThisMeans)
        .await
        .unwrap();
    assert_eq!(text, "Year-end ordering is accelerating.");
}

#[tokio::test]
async fn test_api_error_is_processing_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "rate limited", "type": "rate_limit" }
        })))
        .mount(&server)
        .await;

    let result = analyzer(&server)
        .analyze(&request(), InsightPrompt::NextActions)
        .await;
    match result {
        Err(AnalyzerError::ProcessingFailed(msg)) => assert!(msg.contains("rate limited")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_content_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(null))))
        .mount(&server)
        .await;

    let result = analyzer(&server)
        .analyze(&request(), InsightPrompt::WhatThisMeans)
        .await;
    assert!(matches!(result, Err(AnalyzerError::ProcessingFailed(_))));
}

#[tokio::test]
async fn test_rule_fallback_covers_outage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let analyzer = FallbackAnalyzer::new(analyzer(&server), RuleAnalyzer::new());
    let text = analyzer
        .analyze(&request(), InsightPrompt::WhatThisMeans)
        .await
        .unwrap();
    assert!(text.contains("fiscal year-end"));
}
