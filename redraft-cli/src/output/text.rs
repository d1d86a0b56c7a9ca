//! Text output formatting with colors.

use chrono::{DateTime, Local, Utc};
use redraft_core::{
    CostEstimate, ModelInfo, ModelTarget, PromptLayer, PromptLayers, RevisionBundle,
    SessionTotals, TokenUsage,
};
use redraft_store::{EffectivePrompt, PanelState};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Width of section rules.
const RULE_WIDTH: usize = 40;

/// Separator between sections of an exported file.
const EXPORT_SEPARATOR_WIDTH: usize = 50;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ========================================================================
    // Revision Results
    // ========================================================================

    /// Formats one finished panel.
    pub fn format_panel(&self, panel: &PanelState) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{} {}",
            self.bold(&panel.label),
            self.dim(&format!("({})", panel.provider))
        ));
        lines.push(self.dim(&"─".repeat(RULE_WIDTH)));

        if let Some(error) = &panel.error {
            lines.push(self.red(&format!("✗ {error}")));
            return lines.join("\n");
        }

        if let Some(content) = &panel.content {
            lines.push(content.trim_end().to_string());
        }

        let mut stats = Vec::new();
        if let Some(tokens) = &panel.tokens {
            stats.push(self.format_tokens(tokens));
        }
        if let Some(cost) = panel.cost {
            stats.push(self.green(&format_cost(cost)));
        }
        if !stats.is_empty() {
            lines.push(String::new());
            lines.push(stats.join(" · "));
        }

        lines.join("\n")
    }

    fn format_tokens(&self, tokens: &TokenUsage) -> String {
        let text = format!(
            "{} in / {} out tokens",
            format_number(tokens.input_tokens),
            format_number(tokens.output_tokens)
        );
        if tokens.is_estimated() {
            format!("{} {}", text, self.dim("(estimated)"))
        } else {
            text
        }
    }

    /// One-line round summary.
    pub fn format_round_summary(&self, succeeded: usize, total: usize) -> String {
        let text = format!("{succeeded}/{total} models succeeded");
        if succeeded == total {
            self.green(&text)
        } else if succeeded == 0 {
            self.red(&text)
        } else {
            self.yellow(&text)
        }
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Formats session totals.
    pub fn format_totals(&self, totals: &SessionTotals, updated_at: Option<DateTime<Utc>>) -> String {
        let mut lines = vec![
            self.bold("Session"),
            "─".repeat(RULE_WIDTH),
            format!("Total cost: {}", self.green(&format_cost(totals.total_cost))),
            format!("Requests:   {}", totals.request_count),
        ];

        if let Some(average) = totals.average_cost() {
            lines.push(format!("Average:    {}", format_cost(average)));
        }
        if let Some(updated_at) = updated_at {
            let local = updated_at.with_timezone(&Local);
            lines.push(self.dim(&format!("Updated {}", local.format("%Y-%m-%d %H:%M"))));
        }

        lines.join("\n")
    }

    /// Single-line session spend shown after a round.
    pub fn format_totals_line(&self, totals: &SessionTotals) -> String {
        format!(
            "Session: {} across {} request{}",
            self.green(&format_cost(totals.total_cost)),
            totals.request_count,
            if totals.request_count == 1 { "" } else { "s" }
        )
    }

    // ========================================================================
    // Estimates
    // ========================================================================

    /// Formats per-target estimates with a total.
    pub fn format_estimates(&self, targets: &[ModelTarget], estimates: &[CostEstimate]) -> String {
        let mut lines = vec![
            format!(
                "{:<24} {:>10} {:>10} {:>10}",
                "Model", "Input", "Output", "Cost"
            ),
            "─".repeat(57),
        ];

        for (target, estimate) in targets.iter().zip(estimates) {
            lines.push(format!(
                "{:<24} {:>10} {:>10} {:>10}",
                truncate(target.label(), 24),
                format_number(estimate.input_tokens),
                format_number(estimate.output_tokens),
                format_cost(estimate.cost)
            ));
        }

        let total: f64 = estimates.iter().map(|e| e.cost).sum();
        lines.push("─".repeat(57));
        lines.push(format!(
            "{:<46} {:>10}",
            self.bold("Total"),
            self.green(&format_cost(total))
        ));
        lines.push(self.dim("Token counts are estimates (about 4 characters per token)."));

        lines.join("\n")
    }

    // ========================================================================
    // Models
    // ========================================================================

    /// Formats the model list header.
    pub fn format_models_header(&self) -> String {
        format!(
            "{:<28} {:<10} {:>9} {:>9} {:>8}",
            "Model", "Provider", "In $/M", "Out $/M", "Max out"
        )
    }

    /// Formats one model line.
    pub fn format_model_line(&self, model: &ModelInfo, is_default: bool) -> String {
        let marker = if is_default { "*" } else { " " };
        let max_out = model
            .max_output_tokens
            .map_or_else(|| "-".to_string(), |max| format_number(u64::from(max)));
        let line = format!(
            "{}{:<27} {:<10} {:>9.2} {:>9.2} {:>8}",
            marker,
            truncate(&model.id, 27),
            model.provider.cli_name(),
            model.input_cost_per_million,
            model.output_cost_per_million,
            max_out
        );
        if is_default { self.cyan(&line) } else { line }
    }

    // ========================================================================
    // Prompts
    // ========================================================================

    /// Formats stored layers and the instruction they resolve to.
    pub fn format_prompts(&self, layers: &PromptLayers, effective: &EffectivePrompt) -> String {
        let mut lines = vec![self.bold("System Instruction"), "─".repeat(RULE_WIDTH)];

        for layer in [PromptLayer::Session, PromptLayer::Persistent] {
            let value = layers
                .get(layer)
                .map_or_else(|| self.dim("(not set)"), |text| preview(text, 60));
            lines.push(format!("{:<11} {}", format!("{layer}:"), value));
        }

        lines.push(String::new());
        lines.push(format!("In effect ({}):", self.cyan(effective.layer.as_str())));
        lines.push(effective.text.clone());

        lines.join("\n")
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

// ============================================================================
// Plain Helpers
// ============================================================================

/// Formats a USD amount with four decimals.
pub fn format_cost(cost: f64) -> String {
    format!("${cost:.4}")
}

/// Formats a count with thousands separators.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Renders an export file: one `=== label ===` block per section.
pub fn format_bundle(bundle: &RevisionBundle) -> String {
    let separator = format!("\n{}\n\n", "=".repeat(EXPORT_SEPARATOR_WIDTH));
    bundle
        .sections
        .iter()
        .map(|section| format!("=== {} ===\n\n{}\n", section.label, section.content))
        .collect::<Vec<_>>()
        .join(&separator)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

fn preview(text: &str, max: usize) -> String {
    truncate(&text.split_whitespace().collect::<Vec<_>>().join(" "), max)
}
