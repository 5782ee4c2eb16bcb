use super::{Strategy, StrategyKind};
use crate::context::{EvaluationContext, FlagConfig};
use crate::logger::{OptionalLogger, SharedLogger};
use crate::rule::all_rules_match;

/// Enabled when every configured attribute rule matches.
///
/// An empty or missing `rules` list disables the feature. See
/// [`Rule`](crate::rule::Rule) for the per-rule semantics.
#[derive(Debug, Clone, Default)]
pub struct CustomAttributeStrategy {
    logger: OptionalLogger,
}

impl CustomAttributeStrategy {
    pub fn new(logger: Option<SharedLogger>) -> Self {
        Self {
            logger: OptionalLogger::new(logger),
        }
    }
}

impl Strategy for CustomAttributeStrategy {
    fn name(&self) -> &str {
        StrategyKind::CustomAttribute.as_str()
    }

    fn is_enabled(&self, config: &FlagConfig, context: &EvaluationContext) -> bool {
        let Some(rules) = config.get_non_empty_array("rules") else {
            self.logger
                .debug("custom_attribute strategy: no rules configured", &[]);
            return false;
        };

        all_rules_match(rules, context)
    }
}
