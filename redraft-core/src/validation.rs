//! Pre-dispatch checks for a revision round.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::models::{MAX_TEMPERATURE, MIN_TEMPERATURE, ModelTarget, NormalizedRequest, ProviderKind};

/// Checks a temperature value.
pub fn validate_temperature(temperature: f64) -> Result<(), ValidationError> {
    if temperature.is_finite() && (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
        Ok(())
    } else {
        Err(ValidationError::TemperatureOutOfRange(temperature))
    }
}

/// Checks that a target's wire model belongs to its configured provider.
///
/// Model names without a recognizable vendor prefix are accepted as is.
pub fn validate_target(target: &ModelTarget) -> Result<(), ValidationError> {
    match ProviderKind::from_model_name(target.api_model()) {
        Some(actual) if actual != target.provider() => Err(ValidationError::ProviderMismatch {
            model: target.api_model().to_string(),
            expected: target.provider(),
            actual,
        }),
        _ => Ok(()),
    }
}

/// Validates a whole round before anything is sent.
///
/// Checks run in order: text, temperature, target list, then each target.
pub fn validate_round(
    request: &NormalizedRequest,
    targets: &[ModelTarget],
) -> Result<(), ValidationError> {
    if request.text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    validate_temperature(request.temperature)?;
    if targets.is_empty() {
        return Err(ValidationError::NoTargets);
    }

    let mut seen = HashSet::with_capacity(targets.len());
    for target in targets {
        if !seen.insert(target.id.as_str()) {
            return Err(ValidationError::DuplicateTarget(target.id.clone()));
        }
        validate_target(target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelInfo;

    fn target(id: &str, model: &str, provider: ProviderKind) -> ModelTarget {
        ModelInfo::new(model, provider).to_target(id)
    }

    fn request(text: &str, temperature: f64) -> NormalizedRequest {
        NormalizedRequest::new(text, "instruction", temperature)
    }

    #[test]
    fn test_valid_round() {
        let targets = vec![
            target("output-0", "gpt-4.1", ProviderKind::OpenAi),
            target("output-1", "claude-sonnet-4", ProviderKind::Anthropic),
            target("output-2", "gemini-2.5-pro", ProviderKind::Gemini),
        ];
        assert!(validate_round(&request("text", 0.7), &targets).is_ok());
    }

    #[test]
    fn test_blank_text_rejected() {
        let targets = vec![target("output-0", "gpt-4.1", ProviderKind::OpenAi)];
        assert_eq!(
            validate_round(&request("  \n\t", 0.7), &targets),
            Err(ValidationError::EmptyText)
        );
    }

    #[test]
    fn test_temperature_bounds() {
        assert!(validate_temperature(0.0).is_ok());
        assert!(validate_temperature(1.0).is_ok());
        assert!(validate_temperature(-0.1).is_err());
        assert!(validate_temperature(1.01).is_err());
        assert!(validate_temperature(f64::NAN).is_err());
    }

    #[test]
    fn test_no_targets_rejected() {
        assert_eq!(
            validate_round(&request("text", 0.5), &[]),
            Err(ValidationError::NoTargets)
        );
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let targets = vec![
            target("output-0", "gpt-4.1", ProviderKind::OpenAi),
            target("output-0", "gpt-4.1-mini", ProviderKind::OpenAi),
        ];
        assert_eq!(
            validate_round(&request("text", 0.5), &targets),
            Err(ValidationError::DuplicateTarget("output-0".to_string()))
        );
    }

    #[test]
    fn test_same_model_in_two_slots_is_fine() {
        let targets = vec![
            target("output-0", "gpt-4.1", ProviderKind::OpenAi),
            target("output-1", "gpt-4.1", ProviderKind::OpenAi),
        ];
        assert!(validate_round(&request("text", 0.5), &targets).is_ok());
    }

    #[test]
    fn test_provider_mismatch_rejected() {
        let targets = vec![target("output-0", "claude-opus-4", ProviderKind::OpenAi)];
        let err = validate_round(&request("text", 0.5), &targets).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ProviderMismatch {
                expected: ProviderKind::OpenAi,
                actual: ProviderKind::Anthropic,
                ..
            }
        ));
    }

    #[test]
    fn test_unprefixed_model_accepted() {
        let targets = vec![target("output-0", "my-finetune", ProviderKind::OpenAi)];
        assert!(validate_round(&request("text", 0.5), &targets).is_ok());
    }
}
