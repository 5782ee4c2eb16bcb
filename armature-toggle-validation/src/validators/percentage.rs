use super::{check_percentage, check_rollout_hashing};
use crate::{StrategyValidator, ValidationResult};
use armature_toggle_core::{FlagConfig, StrategyKind};

/// Validates percentage rollouts
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentageValidator;

impl StrategyValidator for PercentageValidator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Percentage
    }

    fn validate(&self, config: &FlagConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        match check_percentage(config.get("percentage"), "percentage", &mut result) {
            Some(p) if p == 0.0 => {
                result.add_warning("percentage is 0; the feature is disabled for everyone")
            }
            Some(p) if p == 100.0 => {
                result.add_warning("percentage is 100; the feature is enabled for everyone")
            }
            _ => {}
        }

        check_rollout_hashing(config, &mut result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(value: serde_json::Value) -> ValidationResult {
        PercentageValidator.validate(&FlagConfig::from_value(value).unwrap())
    }

    #[test]
    fn test_valid_rollout() {
        let result = validate(json!({
            "strategy": "percentage",
            "percentage": 25,
            "stickiness": "account_id",
            "hash_algorithm": "md5",
            "hash_seed": "checkout"
        }));
        assert!(result.is_valid());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_percentage_bounds() {
        assert_eq!(validate(json!({})).errors(), ["percentage is required"]);
        assert_eq!(
            validate(json!({"percentage": -1})).errors(),
            ["percentage must be between 0 and 100"]
        );
        assert_eq!(
            validate(json!({"percentage": 150.5})).errors(),
            ["percentage must be between 0 and 100"]
        );
        assert_eq!(
            validate(json!({"percentage": [50]})).errors(),
            ["percentage must be a number"]
        );
    }

    #[test]
    fn test_edge_percentages_warn() {
        let zero = validate(json!({"percentage": 0}));
        assert!(zero.is_valid());
        assert_eq!(zero.warnings().len(), 1);

        let full = validate(json!({"percentage": 100}));
        assert!(full.is_valid());
        assert_eq!(full.warnings().len(), 1);
    }

    #[test]
    fn test_unknown_hash_algorithm() {
        let result = validate(json!({"percentage": 10, "hash_algorithm": "murmur3"}));
        assert_eq!(result.errors(), ["hash_algorithm must be one of: crc32, md5, sha256"]);
    }

    #[test]
    fn test_empty_stickiness() {
        assert!(!validate(json!({"percentage": 10, "stickiness": ""})).is_valid());
        assert!(!validate(json!({"percentage": 10, "stickiness": []})).is_valid());
        assert!(validate(json!({"percentage": 10, "stickiness": ["session_id"]})).is_valid());
    }
}
