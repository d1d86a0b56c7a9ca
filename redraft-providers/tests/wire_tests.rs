//! Adapter tests against mock vendor servers.

use std::sync::{Arc, Mutex};

use redraft_core::{
    CostRecorder, FailureKind, NormalizedRequest, ProviderKind, UsageSource,
};
use redraft_fetch::{
    FetchContext, FetchSettings, MemoryKeychain, ProviderAdapter, ProviderEndpoint, ProviderError,
};
use redraft_providers::{
    AnthropicAdapter, GeminiAdapter, ModelCatalog, OpenAiAdapter, ProviderRegistry,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn context(base_url: &str) -> FetchContext {
    let mut settings = FetchSettings::default();
    for kind in ProviderKind::all() {
        settings = settings.with_endpoint(
            *kind,
            ProviderEndpoint::with_api_key("test-key").base_url(base_url),
        );
    }
    FetchContext::builder()
        .keychain(Arc::new(MemoryKeychain::new()))
        .settings(settings)
        .build()
        .unwrap()
}

fn request() -> NormalizedRequest {
    NormalizedRequest::new("Teh text.", "Fix typos.", 0.7)
}

#[derive(Default)]
struct Totals(Mutex<Vec<f64>>);

impl CostRecorder for Totals {
    fn record(&self, cost: f64) {
        self.0.lock().unwrap().push(cost);
    }
}

// ============================================================================
// OpenAI
// ============================================================================

#[tokio::test]
async fn test_openai_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4.1",
            "messages": [
                {"role": "system", "content": "Fix typos."},
                {"role": "user", "content": "Teh text."}
            ],
            "temperature": 0.7
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "The text."}}],
            "usage": {"prompt_tokens": 15, "completion_tokens": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server.uri());
    let target = ModelCatalog::builtin().targets(&["gpt-4.1"]).unwrap().remove(0);

    let completion = OpenAiAdapter::new().invoke(&ctx, &target, &request()).await.unwrap();
    assert_eq!(completion.text, "The text.");
    assert_eq!(completion.usage.unwrap().input_tokens, Some(15));
}

#[tokio::test]
async fn test_openai_reasoning_model_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "o4-mini",
            "messages": [{"role": "user", "content": "Fix typos.\n\nTeh text."}],
            "max_completion_tokens": 100_000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "The text."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server.uri());
    let target = ModelCatalog::builtin().targets(&["o4-mini-high"]).unwrap().remove(0);

    let completion = OpenAiAdapter::new().invoke(&ctx, &target, &request()).await.unwrap();
    assert_eq!(completion.text, "The text.");
    assert!(completion.usage.is_none());
}

#[tokio::test]
async fn test_openai_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let ctx = context(&server.uri());
    let target = ModelCatalog::builtin().targets(&["gpt-4.1"]).unwrap().remove(0);

    let err = OpenAiAdapter::new().invoke(&ctx, &target, &request()).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Auth);
    assert!(err.to_string().contains("Incorrect API key"));
}

// ============================================================================
// Anthropic
// ============================================================================

#[tokio::test]
async fn test_anthropic_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-sonnet-4-20250514",
            "system": "Fix typos.",
            "max_tokens": 64000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "The text."}],
            "usage": {"input_tokens": 12, "output_tokens": 4}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server.uri());
    let target = ModelCatalog::builtin()
        .targets(&["claude-sonnet-4-20250514"])
        .unwrap()
        .remove(0);

    let completion = AnthropicAdapter::new().invoke(&ctx, &target, &request()).await.unwrap();
    assert_eq!(completion.text, "The text.");
    assert_eq!(completion.usage.unwrap().output_tokens, Some(4));
}

#[tokio::test]
async fn test_anthropic_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "30")
                .set_body_json(json!({
                    "type": "error",
                    "error": {"type": "rate_limit_error", "message": "Slow down"}
                })),
        )
        .mount(&server)
        .await;

    let ctx = context(&server.uri());
    let target = ModelCatalog::builtin()
        .targets(&["claude-opus-4-20250514"])
        .unwrap()
        .remove(0);

    let err = AnthropicAdapter::new().invoke(&ctx, &target, &request()).await.unwrap_err();
    assert_eq!(
        err,
        ProviderError::RateLimited {
            retry_after: Some(30),
            message: "Slow down".to_string(),
        }
    );
}

// ============================================================================
// Gemini
// ============================================================================

#[tokio::test]
async fn test_gemini_success_without_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "Fix typos.\n\nTeh text."}]}],
            "generationConfig": {"temperature": 0.7, "maxOutputTokens": 8192}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "The text."}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server.uri());
    let target = ModelCatalog::builtin().targets(&["gemini-2.5-pro"]).unwrap().remove(0);

    let completion = GeminiAdapter::new().invoke(&ctx, &target, &request()).await.unwrap();
    assert_eq!(completion.text, "The text.");
    assert!(completion.usage.is_none());
}

#[tokio::test]
async fn test_gemini_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}
        })))
        .mount(&server)
        .await;

    let ctx = context(&server.uri());
    let target = ModelCatalog::builtin().targets(&["gemini-2.5-flash"]).unwrap().remove(0);

    let err = GeminiAdapter::new().invoke(&ctx, &target, &request()).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Response);
    assert!(err.to_string().contains("503"));
    assert!(err.to_string().contains("overloaded"));
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_malformed_body_is_response_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let ctx = context(&server.uri());
    let target = ModelCatalog::builtin().targets(&["gpt-4.1-nano"]).unwrap().remove(0);

    let err = OpenAiAdapter::new().invoke(&ctx, &target, &request()).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Response);
}

#[tokio::test]
async fn test_connection_refused_is_network_failure() {
    let ctx = context("http://127.0.0.1:1");
    let target = ModelCatalog::builtin().targets(&["gpt-4.1"]).unwrap().remove(0);

    let err = OpenAiAdapter::new().invoke(&ctx, &target, &request()).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Network);
}

#[tokio::test]
async fn test_missing_key_is_auth_failure_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let settings = FetchSettings::default().with_endpoint(
        ProviderKind::Gemini,
        ProviderEndpoint {
            api_key: None,
            api_key_env: Some("REDRAFT_TEST_UNSET_WIRE_KEY".to_string()),
            base_url: Some(server.uri()),
        },
    );
    let ctx = FetchContext::builder()
        .keychain(Arc::new(MemoryKeychain::new()))
        .settings(settings)
        .build()
        .unwrap();
    let target = ModelCatalog::builtin().targets(&["gemini-2.5-pro"]).unwrap().remove(0);

    let err = GeminiAdapter::new().invoke(&ctx, &target, &request()).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Auth);
}

// ============================================================================
// Full Round
// ============================================================================

#[tokio::test]
async fn test_round_across_all_vendors_isolates_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "OpenAI revision"}}],
            "usage": {"prompt_tokens": 1000, "completion_tokens": 500}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Gemini revision"}]}}]
        })))
        .mount(&server)
        .await;

    let totals = Arc::new(Totals::default());
    let fanout = ProviderRegistry::build_fanout(Arc::new(context(&server.uri())))
        .with_recorder(totals.clone());
    let targets = ModelCatalog::builtin().default_targets().unwrap();

    let results = fanout.run(request(), targets).await.unwrap();

    assert_eq!(results.len(), 3);

    // claude-sonnet-4 in slot 0
    assert_eq!(results[0].target_id, "output-0");
    assert_eq!(results[0].error_kind(), Some(FailureKind::Response));
    assert!(results[0].cost().abs() < f64::EPSILON);

    // gpt-4.1: 1000 * 2 + 500 * 8 = 6000 / 1e6
    assert_eq!(results[1].content(), Some("OpenAI revision"));
    assert_eq!(results[1].usage().unwrap().source, UsageSource::Reported);
    assert!((results[1].cost() - 0.006).abs() < 1e-12);

    // gemini without usage is estimated from the combined prompt it was sent:
    // "Fix typos.\n\nTeh text." is 21 chars
    assert_eq!(results[2].content(), Some("Gemini revision"));
    let usage = results[2].usage().unwrap();
    assert_eq!(usage.source, UsageSource::Estimated);
    assert_eq!(usage.input_tokens, 6);

    let recorded = totals.0.lock().unwrap();
    assert_eq!(recorded.len(), 2);
}

#[tokio::test]
async fn test_empty_reply_is_failure_and_not_charged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": ""}}],
            "usage": {"prompt_tokens": 15, "completion_tokens": 0}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": " \n "}],
            "usage": {"input_tokens": 12, "output_tokens": 1}
        })))
        .mount(&server)
        .await;

    let totals = Arc::new(Totals::default());
    let fanout = ProviderRegistry::build_fanout(Arc::new(context(&server.uri())))
        .with_recorder(totals.clone());
    let targets = ModelCatalog::builtin()
        .targets(&["gpt-4.1", "claude-sonnet-4-20250514"])
        .unwrap();

    let results = fanout.run(request(), targets).await.unwrap();

    for result in &results {
        assert_eq!(result.error_kind(), Some(FailureKind::Response));
        assert!(result.error_message().unwrap().contains("Empty content"));
    }
    assert!(totals.0.lock().unwrap().is_empty());
}
