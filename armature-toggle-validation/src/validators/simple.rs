use crate::{StrategyValidator, ValidationResult};
use armature_toggle_core::{FlagConfig, StrategyKind};

/// The simple strategy takes no settings
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleValidator;

impl StrategyValidator for SimpleValidator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Simple
    }

    fn validate(&self, _config: &FlagConfig) -> ValidationResult {
        ValidationResult::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_valid() {
        let result = SimpleValidator.validate(&FlagConfig::for_strategy("simple").with("extra", 1));
        assert!(result.is_valid());
        assert!(!result.has_warnings());
    }
}
