//! Serde tests for core types.
//!
//! These cover the shapes that are persisted (settings, session file) or
//! printed as JSON by the CLI.

use serde_json::json;

use crate::{
    FailureKind, ModelInfo, NormalizedResult, Outcome, PromptLayer, PromptLayers, ProviderKind,
    SessionTotals, TargetUpdate, TokenUsage, UsageSource,
};

// ============================================================================
// ProviderKind Serde Tests
// ============================================================================

#[test]
fn test_provider_kind_serde_roundtrip_all_variants() {
    for kind in ProviderKind::all() {
        let json = serde_json::to_string(kind).unwrap();
        let deserialized: ProviderKind = serde_json::from_str(&json).unwrap();
        assert_eq!(*kind, deserialized, "Round-trip failed for {kind:?}");
    }
}

#[test]
fn test_provider_kind_deserialize_lowercase() {
    let test_cases = vec![
        (r#""openai""#, ProviderKind::OpenAi),
        (r#""anthropic""#, ProviderKind::Anthropic),
        (r#""gemini""#, ProviderKind::Gemini),
    ];

    for (json, expected) in test_cases {
        let result: ProviderKind = serde_json::from_str(json).unwrap();
        assert_eq!(result, expected, "Failed for {json}");
    }
}

#[test]
fn test_provider_kind_invalid_deserialize() {
    let result: Result<ProviderKind, _> = serde_json::from_str(r#""mistral""#);
    assert!(result.is_err());
}

// ============================================================================
// ModelInfo Serde Tests
// ============================================================================

#[test]
fn test_model_info_optional_fields_default() {
    let value = json!({
        "id": "gemini-2.5-flash",
        "display_name": "Gemini 2.5 Flash",
        "provider": "gemini",
        "api_model": "gemini-2.5-flash",
        "input_cost_per_million": 0.5,
        "output_cost_per_million": 2.0
    });

    let model: ModelInfo = serde_json::from_value(value).unwrap();
    assert_eq!(model.provider, ProviderKind::Gemini);
    assert!(model.max_output_tokens.is_none());
    assert!(model.context_window.is_none());
}

// ============================================================================
// Result Serde Tests
// ============================================================================

#[test]
fn test_success_result_shape() {
    let result = NormalizedResult::success(
        "output-0",
        ProviderKind::Anthropic,
        "Better text.",
        TokenUsage::reported(12, 4),
        0.000_096,
    );

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["target_id"], "output-0");
    assert_eq!(value["provider"], "anthropic");
    assert_eq!(value["outcome"]["status"], "success");
    assert_eq!(value["outcome"]["content"], "Better text.");
    assert_eq!(value["outcome"]["usage"]["source"], "reported");
}

#[test]
fn test_failure_result_roundtrip() {
    let result = NormalizedResult::failure(
        "output-2",
        ProviderKind::OpenAi,
        FailureKind::Network,
        "connection reset",
    );

    let json = serde_json::to_string(&result).unwrap();
    let deserialized: NormalizedResult = serde_json::from_str(&json).unwrap();
    match deserialized.outcome {
        Outcome::Failure { kind, message } => {
            assert_eq!(kind, FailureKind::Network);
            assert_eq!(message, "connection reset");
        }
        Outcome::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn test_target_update_serializes_nulls() {
    let update = TargetUpdate::loading("output-1");
    let value = serde_json::to_value(&update).unwrap();
    assert_eq!(value["loading"], true);
    assert!(value["content"].is_null());
    assert!(value["error"].is_null());
}

#[test]
fn test_usage_source_lowercase() {
    let usage = TokenUsage::estimated("abcd", "abcdefgh");
    let value = serde_json::to_value(usage).unwrap();
    assert_eq!(value["source"], "estimated");
    assert_eq!(value["input_tokens"], 1);
    assert_eq!(value["output_tokens"], 2);

    let source: UsageSource = serde_json::from_str(r#""reported""#).unwrap();
    assert_eq!(source, UsageSource::Reported);
}

// ============================================================================
// Prompt & Session Serde Tests
// ============================================================================

#[test]
fn test_prompt_layers_missing_fields_default() {
    let layers: PromptLayers = serde_json::from_str(r#"{"persistent":"Be brief."}"#).unwrap();
    assert!(layers.current.is_none());
    assert!(layers.session.is_none());
    assert_eq!(layers.resolve("d"), "Be brief.");
    assert_eq!(layers.resolve_with_layer("d").layer, PromptLayer::Persistent);
}

#[test]
fn test_session_totals_roundtrip() {
    let totals = SessionTotals {
        total_cost: 0.125,
        request_count: 7,
    };
    let json = serde_json::to_string(&totals).unwrap();
    let deserialized: SessionTotals = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, totals);
}
