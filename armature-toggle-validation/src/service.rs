// Validation entry point

use crate::validators::{
    CompositeStrategyValidator, CustomAttributeValidator, DateRangeValidator, GeoValidator,
    IpValidator, PercentageValidator, ProgressiveRolloutValidator, SegmentValidator,
    SimpleValidator, UserIdValidator, collect_required_context,
};
use crate::{InvalidConfigurationError, StrategyValidator, ValidationResult};
use armature_toggle_core::{FlagConfig, SegmentRepository, StrategyKind, ToggleConfig};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Dispatches flag configurations to the validator for their `strategy`.
///
/// Built once and read-only afterwards; share it freely between threads.
pub struct ValidationService {
    config: ToggleConfig,
    validators: HashMap<StrategyKind, Arc<dyn StrategyValidator>>,
    composite: Arc<CompositeStrategyValidator>,
}

impl ValidationService {
    pub fn builder() -> ValidationServiceBuilder {
        ValidationServiceBuilder::new()
    }

    /// Service with default settings and no segment repository
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Service configured from a [`ToggleConfig`]
    pub fn with_config(config: ToggleConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &ToggleConfig {
        &self.config
    }

    /// Validator registered for a strategy kind
    pub fn validator(&self, kind: StrategyKind) -> Option<Arc<dyn StrategyValidator>> {
        self.validators.get(&kind).cloned()
    }

    /// Validate one flag configuration, collecting every problem
    pub fn validate(&self, config: &FlagConfig) -> ValidationResult {
        let Some(name) = config.strategy() else {
            debug!("Rejected toggle configuration without a strategy");
            return ValidationResult::with_error("strategy is required");
        };

        let Some(validator) = StrategyKind::parse(name).and_then(|kind| self.validators.get(&kind))
        else {
            debug!(strategy = %name, "Rejected toggle configuration with unknown strategy");
            let known: Vec<&str> = StrategyKind::ALL.iter().map(|kind| kind.as_str()).collect();
            return ValidationResult::with_error(format!(
                "Unknown strategy '{}'. Known strategies: {}",
                name,
                known.join(", ")
            ));
        };

        let mut result = validator.validate(config);

        match config.get("enabled") {
            None | Some(Value::Null) | Some(Value::Bool(_)) => {}
            Some(_) => result.add_error("enabled must be a boolean"),
        }

        debug!(
            strategy = %name,
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            "Validated toggle configuration"
        );
        result
    }

    /// Validate, failing when any error was found.
    ///
    /// A valid result is returned with its warnings; the error carries the
    /// full result.
    pub fn validate_or_throw(
        &self,
        config: &FlagConfig,
    ) -> Result<ValidationResult, InvalidConfigurationError> {
        let result = self.validate(config);
        if result.is_valid() {
            return Ok(result);
        }

        let strategy = config.strategy().unwrap_or("unknown");
        warn!(
            strategy = %strategy,
            errors = result.errors().len(),
            "Invalid toggle configuration"
        );
        Err(InvalidConfigurationError::new(strategy, result))
    }

    /// Validate a set of named flags; results are keyed by flag name
    pub fn validate_all<'a, I>(&self, flags: I) -> BTreeMap<String, ValidationResult>
    where
        I: IntoIterator<Item = (&'a String, &'a FlagConfig)>,
    {
        flags
            .into_iter()
            .map(|(name, config)| (name.clone(), self.validate(config)))
            .collect()
    }

    /// Context attributes an evaluation of `config` may read, sorted.
    ///
    /// Unknown strategies need nothing.
    pub fn required_context(&self, config: &FlagConfig) -> Vec<String> {
        match config.strategy().and_then(StrategyKind::parse) {
            Some(StrategyKind::Composite) => self.composite.get_required_context(config),
            Some(kind) => {
                let mut keys = BTreeSet::new();
                collect_required_context(kind, config, 1, &mut keys);
                keys.into_iter().collect()
            }
            None => Vec::new(),
        }
    }
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValidationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationService")
            .field("config", &self.config)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Builder for [`ValidationService`]
#[derive(Default)]
pub struct ValidationServiceBuilder {
    config: ToggleConfig,
    segments: Option<Arc<dyn SegmentRepository>>,
}

impl ValidationServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default timezone and large-list threshold
    pub fn config(mut self, config: ToggleConfig) -> Self {
        self.config = config;
        self
    }

    /// Repository used to warn about undefined segment names
    pub fn segments(mut self, repository: Arc<dyn SegmentRepository>) -> Self {
        self.segments = Some(repository);
        self
    }

    pub fn build(self) -> ValidationService {
        let tz = self.config.default_timezone;
        let leaves: Vec<Arc<dyn StrategyValidator>> = vec![
            Arc::new(UserIdValidator::new(self.config.large_list_threshold)),
            Arc::new(PercentageValidator),
            Arc::new(DateRangeValidator::new(tz)),
            Arc::new(GeoValidator),
            Arc::new(IpValidator),
            Arc::new(CustomAttributeValidator),
            Arc::new(SegmentValidator::new(self.segments)),
            Arc::new(ProgressiveRolloutValidator::new(tz)),
        ];
        let composite = Arc::new(CompositeStrategyValidator::new(leaves.iter().cloned()));

        let mut validators: HashMap<StrategyKind, Arc<dyn StrategyValidator>> = leaves
            .into_iter()
            .map(|validator| (validator.kind(), validator))
            .collect();
        validators.insert(StrategyKind::Simple, Arc::new(SimpleValidator));
        validators.insert(StrategyKind::Composite, composite.clone());

        debug!(validators = validators.len(), "Built toggle validation service");

        ValidationService {
            config: self.config,
            validators,
            composite,
        }
    }
}
