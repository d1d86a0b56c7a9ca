//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::{TextFormatter, format_bundle, format_cost, format_number};
    use redraft_core::{
        CostEstimate, ModelInfo, PromptLayer, PromptLayers, ProviderKind, RevisionBundle,
        SessionTotals, TokenUsage,
    };
    use redraft_store::{EffectivePrompt, PanelState};

    fn panel() -> PanelState {
        PanelState {
            target_id: "output-0".to_string(),
            label: "GPT-4.1".to_string(),
            provider: ProviderKind::OpenAi,
            loading: false,
            content: Some("Their revised text.\n".to_string()),
            cost: Some(0.006),
            tokens: Some(TokenUsage::reported(1000, 500)),
            error: None,
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(0.006), "$0.0060");
        assert_eq!(format_cost(0.0), "$0.0000");
        assert_eq!(format_cost(1.5), "$1.5000");
    }

    #[test]
    fn test_format_panel_success() {
        let output = TextFormatter::new(false).format_panel(&panel());

        assert!(output.starts_with("GPT-4.1 (OpenAI)"));
        assert!(output.contains("Their revised text."));
        assert!(output.contains("1,000 in / 500 out tokens"));
        assert!(output.contains("$0.0060"));
        assert!(!output.contains("estimated"));
    }

    #[test]
    fn test_format_panel_estimated_usage() {
        let mut panel = panel();
        panel.tokens = Some(TokenUsage::estimated(&"x".repeat(400), &"y".repeat(200)));

        let output = TextFormatter::new(false).format_panel(&panel);
        assert!(output.contains("100 in / 50 out tokens (estimated)"));
    }

    #[test]
    fn test_format_panel_failure() {
        let mut panel = panel();
        panel.content = None;
        panel.cost = None;
        panel.tokens = None;
        panel.error = Some("Rate limited: Slow down".to_string());

        let output = TextFormatter::new(false).format_panel(&panel);
        assert!(output.contains("✗ Rate limited: Slow down"));
        assert!(!output.contains('$'));
    }

    #[test]
    fn test_format_panel_with_colors() {
        let mut panel = panel();
        panel.error = Some("Authentication failed".to_string());

        let output = TextFormatter::new(true).format_panel(&panel);
        assert!(output.contains("\x1b[31m"), "errors should be red");
    }

    #[test]
    fn test_format_round_summary_colors() {
        let formatter = TextFormatter::new(true);
        assert!(formatter.format_round_summary(3, 3).contains("\x1b[32m"));
        assert!(formatter.format_round_summary(2, 3).contains("\x1b[33m"));
        assert!(formatter.format_round_summary(0, 3).contains("\x1b[31m"));
        assert_eq!(
            TextFormatter::new(false).format_round_summary(2, 3),
            "2/3 models succeeded"
        );
    }

    #[test]
    fn test_format_totals() {
        let formatter = TextFormatter::new(false);
        let totals = SessionTotals {
            total_cost: 0.06,
            request_count: 3,
        };

        let output = formatter.format_totals(&totals, None);
        assert!(output.contains("Total cost: $0.0600"));
        assert!(output.contains("Requests:   3"));
        assert!(output.contains("Average:    $0.0200"));

        let empty = formatter.format_totals(&SessionTotals::default(), None);
        assert!(!empty.contains("Average"));

        assert_eq!(
            formatter.format_totals_line(&SessionTotals {
                total_cost: 0.01,
                request_count: 1
            }),
            "Session: $0.0100 across 1 request"
        );
    }

    #[test]
    fn test_format_estimates() {
        let model = ModelInfo::new("gpt-4.1", ProviderKind::OpenAi)
            .with_display_name("GPT-4.1")
            .with_pricing(2.0, 8.0);
        let target = model.to_target("output-0");
        let estimate = CostEstimate::for_target(&target, "Edit.", &"x".repeat(400));

        let output = TextFormatter::new(false).format_estimates(&[target], &[estimate.clone()]);
        assert!(output.contains("GPT-4.1"));
        assert!(output.contains(&format_number(estimate.input_tokens)));
        assert!(output.contains(&format_cost(estimate.cost)));
        assert!(output.contains("Total"));
    }

    #[test]
    fn test_format_model_line() {
        let formatter = TextFormatter::new(false);
        let model = ModelInfo::new("gemini-2.5-pro", ProviderKind::Gemini)
            .with_pricing(1.25, 10.0)
            .with_max_output_tokens(8192);

        let line = formatter.format_model_line(&model, true);
        assert!(line.starts_with("*gemini-2.5-pro"));
        assert!(line.contains("gemini"));
        assert!(line.contains("1.25"));
        assert!(line.contains("10.00"));
        assert!(line.contains("8,192"));

        let plain = formatter.format_model_line(&model, false);
        assert!(plain.starts_with(' '));
    }

    #[test]
    fn test_format_prompts() {
        let formatter = TextFormatter::new(false);
        let layers = PromptLayers {
            current: None,
            session: None,
            persistent: Some("Use British spelling.\nKeep it short.".to_string()),
        };
        let effective = EffectivePrompt {
            text: "Use British spelling.\nKeep it short.".to_string(),
            layer: PromptLayer::Persistent,
        };

        let output = formatter.format_prompts(&layers, &effective);
        assert!(output.contains("session:    (not set)"));
        assert!(output.contains("persistent: Use British spelling. Keep it short."));
        assert!(output.contains("In effect (persistent):"));
    }

    #[test]
    fn test_format_bundle() {
        let mut bundle = RevisionBundle::new();
        bundle.push("GPT-4.1", ProviderKind::OpenAi, "One.");
        bundle.push("Claude Sonnet 4", ProviderKind::Anthropic, "Two.");

        let expected = format!(
            "=== GPT-4.1 ===\n\nOne.\n\n{}\n\n=== Claude Sonnet 4 ===\n\nTwo.\n",
            "=".repeat(50)
        );
        assert_eq!(format_bundle(&bundle), expected);
    }

    #[test]
    fn test_format_bundle_single_section_has_no_separator() {
        let mut bundle = RevisionBundle::new();
        bundle.push("GPT-4.1", ProviderKind::OpenAi, "Only.");
        assert_eq!(format_bundle(&bundle), "=== GPT-4.1 ===\n\nOnly.\n");
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use redraft_core::{
        FailureKind, ModelInfo, NormalizedResult, PromptLayer, ProviderKind, SessionTotals,
        TokenUsage,
    };

    #[test]
    fn test_format_pretty_json() {
        let formatter = JsonFormatter::new(true);

        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();

        // Pretty output should have newlines
        assert!(output.contains('\n'));
        assert!(output.contains("  ")); // Indentation
    }

    #[test]
    fn test_format_compact_json() {
        let formatter = JsonFormatter::new(false);

        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();

        assert_eq!(output, r#"{"key":"value"}"#);
    }

    #[test]
    fn test_format_round() {
        let formatter = JsonFormatter::new(false);
        let targets = vec![
            ModelInfo::new("gpt-4.1", ProviderKind::OpenAi)
                .with_display_name("GPT-4.1")
                .to_target("output-0"),
            ModelInfo::new("claude-sonnet-4-20250514", ProviderKind::Anthropic)
                .with_display_name("Claude Sonnet 4")
                .to_target("output-1"),
        ];
        let results = vec![
            NormalizedResult::success(
                "output-0",
                ProviderKind::OpenAi,
                "Revised.",
                TokenUsage::reported(1000, 500),
                0.006,
            ),
            NormalizedResult::failure(
                "output-1",
                ProviderKind::Anthropic,
                FailureKind::RateLimit,
                "Rate limited: Slow down",
            ),
        ];
        let totals = SessionTotals {
            total_cost: 0.006,
            request_count: 1,
        };

        let output = formatter
            .format_round(&targets, &results, PromptLayer::Default, &totals, None)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["promptLayer"], "default");
        assert!(parsed.get("exportPath").is_none());

        let ok = &parsed["results"][0];
        assert_eq!(ok["targetId"], "output-0");
        assert_eq!(ok["model"], "gpt-4.1");
        assert_eq!(ok["label"], "GPT-4.1");
        assert_eq!(ok["status"], "success");
        assert_eq!(ok["usage"]["inputTokens"], 1000);
        assert_eq!(ok["usage"]["source"], "reported");
        assert_eq!(ok["costUsd"], 0.006);
        assert!(ok.get("error").is_none());

        let failed = &parsed["results"][1];
        assert_eq!(failed["status"], "failure");
        assert_eq!(failed["provider"], "anthropic");
        assert_eq!(failed["errorKind"], "rate_limit");
        assert_eq!(failed["error"], "Rate limited: Slow down");
        assert!(failed.get("content").is_none());

        assert_eq!(parsed["session"]["requestCount"], 1);
    }

    #[test]
    fn test_format_totals() {
        let formatter = JsonFormatter::new(false);
        let output = formatter
            .format_totals(&SessionTotals::default(), None)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["totalCostUsd"], 0.0);
        assert_eq!(parsed["requestCount"], 0);
        assert!(parsed.get("averageCostUsd").is_none());
    }

    #[test]
    fn test_format_models_marks_defaults() {
        let formatter = JsonFormatter::new(false);
        let a = ModelInfo::new("gpt-4.1", ProviderKind::OpenAi).with_pricing(2.0, 8.0);
        let b = ModelInfo::new("gpt-4.1-mini", ProviderKind::OpenAi).with_pricing(0.4, 1.6);

        let output = formatter
            .format_models(&[&a, &b], &["gpt-4.1".to_string()])
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed[0]["isDefault"], true);
        assert_eq!(parsed[1]["isDefault"], false);
        assert_eq!(parsed[1]["inputCostPerMillion"], 0.4);
        assert_eq!(parsed[0]["provider"], "openai");
    }
}
