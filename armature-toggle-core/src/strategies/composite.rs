use super::{Strategy, StrategyKind};
use crate::context::{EvaluationContext, FlagConfig};
use crate::logger::{OptionalLogger, SharedLogger};
use std::collections::HashMap;
use std::sync::Arc;

/// Deepest composite nesting accepted by evaluation and validation.
/// The top-level composite is depth 1.
pub const MAX_NESTING_DEPTH: usize = 5;

/// Boolean combination of nested strategies.
///
/// `strategies` is a list of `{type, ...}` entries, each evaluated against
/// the parent's context with the entry itself as configuration. `operator`
/// is `AND` (default) or `OR`, and both short-circuit. An empty list is
/// vacuously enabled. Entries without a `type`, or naming an unregistered
/// one, are skipped. Composites nested deeper than [`MAX_NESTING_DEPTH`]
/// evaluate to `false`.
#[derive(Clone, Default)]
pub struct CompositeStrategy {
    strategies: HashMap<String, Arc<dyn Strategy>>,
    logger: OptionalLogger,
}

impl CompositeStrategy {
    /// Create a composite resolving nested types through `strategies`.
    ///
    /// Nested `composite` entries are always handled by this instance.
    pub fn new(
        strategies: HashMap<String, Arc<dyn Strategy>>,
        logger: Option<SharedLogger>,
    ) -> Self {
        Self {
            strategies,
            logger: OptionalLogger::new(logger),
        }
    }

    /// Names of the strategies nested entries may use
    pub fn strategy_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.strategies.keys().cloned().collect();
        names.push(StrategyKind::Composite.as_str().to_string());
        names.sort();
        names.dedup();
        names
    }

    fn evaluate(&self, config: &FlagConfig, context: &EvaluationContext, depth: usize) -> bool {
        if depth > MAX_NESTING_DEPTH {
            self.logger.error(
                "composite strategy: maximum nesting depth exceeded",
                &[("max_depth", MAX_NESTING_DEPTH.to_string())],
            );
            return false;
        }

        let entries = config.get_array("strategies").map(Vec::as_slice).unwrap_or(&[]);
        if entries.is_empty() {
            return true;
        }

        let any = config
            .get_str("operator")
            .is_some_and(|op| op.eq_ignore_ascii_case("OR"));

        for (index, entry) in entries.iter().enumerate() {
            let Some(sub_config) = FlagConfig::from_value(entry.clone()) else {
                self.skip("entry is not an object", index, None);
                continue;
            };
            let Some(kind) = sub_config.get_str("type").map(str::to_string) else {
                self.skip("entry has no type", index, None);
                continue;
            };

            let enabled = if kind == StrategyKind::Composite.as_str() {
                self.evaluate(&sub_config, context, depth + 1)
            } else if let Some(strategy) = self.strategies.get(&kind) {
                strategy.is_enabled(&sub_config, context)
            } else {
                self.skip("unknown strategy type", index, Some(&kind));
                continue;
            };

            if any && enabled {
                return true;
            }
            if !any && !enabled {
                return false;
            }
        }

        !any
    }

    fn skip(&self, reason: &str, index: usize, kind: Option<&str>) {
        let mut fields = vec![("reason", reason.to_string()), ("index", index.to_string())];
        if let Some(kind) = kind {
            fields.push(("type", kind.to_string()));
        }
        self.logger
            .debug("composite strategy: skipping sub-strategy", &fields);
    }
}

impl Strategy for CompositeStrategy {
    fn name(&self) -> &str {
        StrategyKind::Composite.as_str()
    }

    fn is_enabled(&self, config: &FlagConfig, context: &EvaluationContext) -> bool {
        self.evaluate(config, context, 1)
    }
}

impl std::fmt::Debug for CompositeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeStrategy")
            .field("strategies", &self.strategy_names())
            .field("logger", &self.logger)
            .finish()
    }
}
