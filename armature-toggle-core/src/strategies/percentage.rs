use super::{Strategy, StrategyKind};
use crate::context::{
    EvaluationContext, FlagConfig, SESSION_ID, USER_ID, identifier_value, numeric_value,
};
use crate::hash::{BUCKET_COUNT, HashAlgorithm, HashCalculator};
use crate::logger::{OptionalLogger, SharedLogger};
use serde_json::Value;

/// Attributes tried, in order, when a config names no `stickiness`
pub const DEFAULT_STICKINESS: [&str; 2] = [USER_ID, SESSION_ID];

/// Consistent-hash percentage rollout.
///
/// The identifier is the first stickiness attribute with a usable value.
/// It is hashed with the configured algorithm and seed into one of
/// [`BUCKET_COUNT`] buckets; the feature is on when the bucket falls below
/// `percentage / 100 * BUCKET_COUNT`. Percentages of 100 or more enable
/// everyone, including contexts without an identifier.
#[derive(Debug, Clone, Default)]
pub struct PercentageStrategy {
    logger: OptionalLogger,
}

impl PercentageStrategy {
    pub fn new(logger: Option<SharedLogger>) -> Self {
        Self {
            logger: OptionalLogger::new(logger),
        }
    }

    /// Resolve the bucketing identifier for a context
    pub fn resolve_identifier(config: &FlagConfig, context: &EvaluationContext) -> Option<String> {
        stickiness_attributes(config)
            .iter()
            .find_map(|attribute| context.identifier(attribute))
    }
}

/// Stickiness attributes configured for a rollout, or the default fallback list
pub fn stickiness_attributes(config: &FlagConfig) -> Vec<String> {
    let configured: Vec<String> = match config.get("stickiness") {
        Some(Value::String(attribute)) if !attribute.is_empty() => vec![attribute.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|attribute| !attribute.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    if configured.is_empty() {
        DEFAULT_STICKINESS.iter().map(|s| s.to_string()).collect()
    } else {
        configured
    }
}

impl Strategy for PercentageStrategy {
    fn name(&self) -> &str {
        StrategyKind::Percentage.as_str()
    }

    fn is_enabled(&self, config: &FlagConfig, context: &EvaluationContext) -> bool {
        let percentage = config
            .get("percentage")
            .and_then(numeric_value)
            .unwrap_or(0.0);

        if percentage >= 100.0 {
            return true;
        }
        if percentage <= 0.0 {
            return false;
        }

        let Some(identifier) = Self::resolve_identifier(config, context) else {
            self.logger.debug(
                "percentage strategy: no identifier resolved",
                &[("stickiness", stickiness_attributes(config).join(","))],
            );
            return false;
        };

        let algorithm = HashAlgorithm::parse_or_default(config.get_str("hash_algorithm"));
        let seed = config
            .get("hash_seed")
            .and_then(identifier_value)
            .unwrap_or_default();

        let bucket = HashCalculator::new(algorithm).bucket(&identifier, &seed);
        let threshold = percentage / 100.0 * f64::from(BUCKET_COUNT);

        f64::from(bucket) < threshold
    }
}
