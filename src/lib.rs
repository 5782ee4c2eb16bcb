// Armature Toggle - feature flags for Armature applications
//
// Strategy evaluation lives in armature-toggle-core; configuration
// validation in armature-toggle-validation (default `validation` feature).

// Re-export core functionality
pub use armature_toggle_core::*;

// Re-export optional crates
#[cfg(feature = "validation")]
pub use armature_toggle_validation;

#[cfg(feature = "validation")]
pub use armature_toggle_validation::{
    InvalidConfigurationError, StrategyValidator, ValidationResult, ValidationService,
};

/// Prelude for common imports.
///
/// ```
/// use armature_toggle::prelude::*;
///
/// let registry = StrategyRegistry::new();
/// let config = FlagConfig::for_strategy("simple");
/// assert!(registry.evaluate(&config, &EvaluationContext::new()));
/// ```
pub mod prelude {
    pub use armature_toggle_core::{
        EvaluationContext, FlagConfig, Strategy, StrategyKind, StrategyRegistry, ToggleConfig,
    };

    #[cfg(feature = "validation")]
    pub use armature_toggle_validation::{ValidationResult, ValidationService};
}
