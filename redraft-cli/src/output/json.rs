//! JSON output formatting.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use redraft_core::{
    CostEstimate, FailureKind, ModelInfo, ModelTarget, NormalizedResult, Outcome, PromptLayer,
    PromptLayers, SessionTotals, UsageSource,
};
use redraft_store::EffectivePrompt;
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one target of a round.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultOutput {
    pub target_id: String,
    pub model: String,
    pub label: String,
    pub provider: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Token counts of a successful target.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageOutput {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub source: UsageSource,
}

/// A whole round.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutput {
    pub prompt_layer: PromptLayer,
    pub results: Vec<ResultOutput>,
    pub session: TotalsOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_path: Option<String>,
}

/// Session spend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsOutput {
    pub total_cost_usd: f64,
    pub request_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_cost_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TotalsOutput {
    fn new(totals: &SessionTotals, updated_at: Option<DateTime<Utc>>) -> Self {
        Self {
            total_cost_usd: totals.total_cost,
            request_count: totals.request_count,
            average_cost_usd: totals.average_cost(),
            updated_at,
        }
    }
}

/// One pre-submission estimate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateOutput {
    pub target_id: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

/// All estimates of a round.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatesOutput {
    pub estimates: Vec<EstimateOutput>,
    pub total_cost_usd: f64,
}

/// One catalog entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOutput {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub api_model: String,
    pub input_cost_per_million: f64,
    pub output_cost_per_million: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,
    pub is_default: bool,
}

/// Stored prompt layers and the instruction in effect.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent: Option<String>,
    pub effective_layer: PromptLayer,
    pub effective: String,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(data)?)
        } else {
            Ok(serde_json::to_string(data)?)
        }
    }

    /// Formats the results of a round in slot order.
    pub fn format_round(
        &self,
        targets: &[ModelTarget],
        results: &[NormalizedResult],
        prompt_layer: PromptLayer,
        totals: &SessionTotals,
        export_path: Option<String>,
    ) -> Result<String> {
        let by_id: HashMap<&str, &ModelTarget> =
            targets.iter().map(|t| (t.id.as_str(), t)).collect();

        let results = results
            .iter()
            .map(|result| result_output(result, by_id.get(result.target_id.as_str()).copied()))
            .collect();

        self.format(&RoundOutput {
            prompt_layer,
            results,
            session: TotalsOutput::new(totals, None),
            export_path,
        })
    }

    /// Formats session totals.
    pub fn format_totals(
        &self,
        totals: &SessionTotals,
        updated_at: Option<DateTime<Utc>>,
    ) -> Result<String> {
        self.format(&TotalsOutput::new(totals, updated_at))
    }

    /// Formats pre-submission estimates.
    pub fn format_estimates(&self, estimates: &[CostEstimate]) -> Result<String> {
        let output = EstimatesOutput {
            total_cost_usd: estimates.iter().map(|e| e.cost).sum(),
            estimates: estimates
                .iter()
                .map(|e| EstimateOutput {
                    target_id: e.target_id.clone(),
                    model: e.model_id.clone(),
                    input_tokens: e.input_tokens,
                    output_tokens: e.output_tokens,
                    cost_usd: e.cost,
                })
                .collect(),
        };
        self.format(&output)
    }

    /// Formats catalog entries.
    pub fn format_models(&self, models: &[&ModelInfo], defaults: &[String]) -> Result<String> {
        let output: Vec<ModelOutput> = models
            .iter()
            .map(|m| ModelOutput {
                id: m.id.clone(),
                name: m.display_name.clone(),
                provider: m.provider.cli_name().to_string(),
                api_model: m.api_model.clone(),
                input_cost_per_million: m.input_cost_per_million,
                output_cost_per_million: m.output_cost_per_million,
                max_output_tokens: m.max_output_tokens,
                context_window: m.context_window,
                is_default: defaults.iter().any(|d| d == &m.id),
            })
            .collect();
        self.format(&output)
    }

    /// Formats stored prompt layers.
    pub fn format_prompts(&self, layers: &PromptLayers, effective: &EffectivePrompt) -> Result<String> {
        self.format(&PromptOutput {
            session: layers.session.clone(),
            persistent: layers.persistent.clone(),
            effective_layer: effective.layer,
            effective: effective.text.clone(),
        })
    }
}

fn result_output(result: &NormalizedResult, target: Option<&ModelTarget>) -> ResultOutput {
    let (model, label) = target.map_or_else(
        || (String::new(), result.target_id.clone()),
        |t| (t.model.id.clone(), t.label().to_string()),
    );

    let mut output = ResultOutput {
        target_id: result.target_id.clone(),
        model,
        label,
        provider: result.provider.cli_name().to_string(),
        status: "success",
        content: None,
        usage: None,
        cost_usd: None,
        error_kind: None,
        error: None,
    };

    match &result.outcome {
        Outcome::Success {
            content,
            usage,
            cost,
        } => {
            output.content = Some(content.clone());
            output.usage = Some(UsageOutput {
                input_tokens: usage.input_tokens,
                output_tokens: usage.output_tokens,
                source: usage.source,
            });
            output.cost_usd = Some(*cost);
        }
        Outcome::Failure { kind, message } => {
            output.status = "failure";
            output.error_kind = Some(*kind);
            output.error = Some(message.clone());
        }
    }

    output
}
