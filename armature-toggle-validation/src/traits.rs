// Validation traits

use crate::ValidationResult;
use armature_toggle_core::{FlagConfig, StrategyKind};

/// Validator for one strategy's configuration
pub trait StrategyValidator: Send + Sync {
    /// Strategy this validator checks
    fn kind(&self) -> StrategyKind;

    /// Collect every error and warning in the configuration
    fn validate(&self, config: &FlagConfig) -> ValidationResult;
}
