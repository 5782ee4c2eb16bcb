use super::{Strategy, StrategyKind};
use crate::context::{CITY, COUNTRY, EvaluationContext, FlagConfig, REGION};
use crate::logger::{OptionalLogger, SharedLogger};
use serde_json::Value;

/// Config key and matching context key for each geographic category
pub const GEO_CATEGORIES: [(&str, &str); 3] = [
    ("countries", COUNTRY),
    ("regions", REGION),
    ("cities", CITY),
];

/// Geographic targeting.
///
/// Every configured category must match (AND); within a category any listed
/// value may match (OR). Comparison ignores case. A config without any
/// category, or a context missing an attribute a configured category needs,
/// disables the feature.
#[derive(Debug, Clone, Default)]
pub struct GeoStrategy {
    logger: OptionalLogger,
}

impl GeoStrategy {
    pub fn new(logger: Option<SharedLogger>) -> Self {
        Self {
            logger: OptionalLogger::new(logger),
        }
    }
}

impl Strategy for GeoStrategy {
    fn name(&self) -> &str {
        StrategyKind::Geo.as_str()
    }

    fn is_enabled(&self, config: &FlagConfig, context: &EvaluationContext) -> bool {
        let mut configured = 0;

        for (config_key, context_key) in GEO_CATEGORIES {
            let Some(allowed) = config.get_non_empty_array(config_key) else {
                continue;
            };
            configured += 1;

            let Some(actual) = context.get(context_key).and_then(Value::as_str) else {
                self.logger.debug(
                    "geo strategy: context is missing a required attribute",
                    &[("attribute", context_key.to_string())],
                );
                return false;
            };

            if !matches_any(allowed, actual) {
                return false;
            }
        }

        if configured == 0 {
            self.logger
                .debug("geo strategy: no countries, regions or cities configured", &[]);
        }

        configured > 0
    }
}

fn matches_any(allowed: &[Value], actual: &str) -> bool {
    let actual = actual.to_lowercase();
    allowed
        .iter()
        .filter_map(Value::as_str)
        .any(|candidate| candidate.to_lowercase() == actual)
}
