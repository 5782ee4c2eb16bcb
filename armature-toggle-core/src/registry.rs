//! Strategy registry
//!
//! The registry is the composition root of the engine: it builds every
//! strategy once, wires the composite strategy to its siblings, and is
//! read-only afterwards. It is `Send + Sync` and meant to be shared behind
//! an `Arc` across requests and threads.

use crate::config::ToggleConfig;
use crate::context::{EvaluationContext, FlagConfig};
use crate::logger::{SharedLogger, TracingLogger};
use crate::segment::SegmentRepository;
use crate::strategies::{
    CompositeStrategy, CustomAttributeStrategy, DateRangeStrategy, GeoStrategy, IpStrategy,
    PercentageStrategy, ProgressiveRolloutStrategy, SegmentStrategy, SimpleStrategy, Strategy,
    StrategyKind, UserIdStrategy,
};
use crate::{Result, ToggleError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Name → strategy lookup built once at startup
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn Strategy>>,
    config: ToggleConfig,
}

impl StrategyRegistry {
    /// Create a registry builder
    pub fn builder() -> StrategyRegistryBuilder {
        StrategyRegistryBuilder::new()
    }

    /// Registry with every built-in strategy, default configuration and no segments
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Look up a strategy by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Strategy>> {
        self.strategies.get(name).cloned()
    }

    /// Look up a strategy by name, failing when it is not registered
    pub fn require(&self, name: &str) -> Result<Arc<dyn Strategy>> {
        self.get(name)
            .ok_or_else(|| ToggleError::unknown_strategy(name))
    }

    pub fn has(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.strategies.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn config(&self) -> &ToggleConfig {
        &self.config
    }

    /// Evaluate a flag configuration.
    ///
    /// Dispatches on the config's `strategy`. A config with `enabled: false`
    /// is off without consulting its strategy; a missing or unregistered
    /// strategy is off as well.
    pub fn evaluate(&self, config: &FlagConfig, context: &EvaluationContext) -> bool {
        if matches!(config.get("enabled"), Some(Value::Bool(false))) {
            trace!("Flag disabled by kill switch");
            return false;
        }

        let Some(name) = config.strategy() else {
            debug!("Flag configuration has no strategy");
            return false;
        };

        match self.strategies.get(name) {
            Some(strategy) => {
                let enabled = strategy.is_enabled(config, context);
                trace!(strategy = %name, enabled, "Evaluated flag");
                enabled
            }
            None => {
                debug!(strategy = %name, "Unknown strategy");
                false
            }
        }
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`StrategyRegistry`]
#[derive(Default)]
pub struct StrategyRegistryBuilder {
    config: ToggleConfig,
    segments: Option<Arc<dyn SegmentRepository>>,
    logger: Option<SharedLogger>,
    extra: Vec<Arc<dyn Strategy>>,
}

impl StrategyRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine configuration
    pub fn config(mut self, config: ToggleConfig) -> Self {
        self.config = config;
        self
    }

    /// Segment repository consulted by the segment strategy
    pub fn segments(mut self, repository: Arc<dyn SegmentRepository>) -> Self {
        self.segments = Some(repository);
        self
    }

    /// Logger handed to every strategy. Overrides `log_evaluations`.
    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Register an additional strategy under its own name.
    ///
    /// Additional strategies are visible to composite configurations and
    /// replace a built-in strategy of the same name. The exception is
    /// `composite`: the registry always wires its own composite strategy,
    /// so an additional strategy with that name is ignored with a warning.
    pub fn with_strategy(mut self, strategy: Arc<dyn Strategy>) -> Self {
        self.extra.push(strategy);
        self
    }

    /// Build the registry
    pub fn build(self) -> StrategyRegistry {
        let logger = self.logger.or_else(|| {
            self.config
                .log_evaluations
                .then(TracingLogger::shared)
        });
        let tz = self.config.default_timezone;

        let percentage = PercentageStrategy::new(logger.clone());
        let leaves: Vec<Arc<dyn Strategy>> = vec![
            Arc::new(SimpleStrategy::new()),
            Arc::new(UserIdStrategy::new(logger.clone())),
            Arc::new(percentage.clone()),
            Arc::new(DateRangeStrategy::new(tz, logger.clone())),
            Arc::new(GeoStrategy::new(logger.clone())),
            Arc::new(IpStrategy::new(logger.clone())),
            Arc::new(CustomAttributeStrategy::new(logger.clone())),
            Arc::new(SegmentStrategy::new(self.segments, logger.clone())),
            Arc::new(ProgressiveRolloutStrategy::new(
                percentage,
                tz,
                logger.clone(),
            )),
        ];

        let mut strategies: HashMap<String, Arc<dyn Strategy>> = HashMap::new();
        for strategy in leaves.into_iter().chain(self.extra) {
            if strategy.name() == StrategyKind::Composite.as_str() {
                warn!("Ignoring additional strategy named 'composite'");
                continue;
            }
            if strategies
                .insert(strategy.name().to_string(), strategy.clone())
                .is_some()
            {
                debug!(strategy = %strategy.name(), "Replacing built-in strategy");
            }
        }

        let composite = CompositeStrategy::new(strategies.clone(), logger);
        strategies.insert(composite.name().to_string(), Arc::new(composite));

        debug!(count = strategies.len(), "Built strategy registry");

        StrategyRegistry {
            strategies,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{InMemorySegmentRepository, StaticSegment};
    use serde_json::json;

    struct AlwaysOff;

    impl Strategy for AlwaysOff {
        fn name(&self) -> &str {
            "always_off"
        }

        fn is_enabled(&self, _config: &FlagConfig, _context: &EvaluationContext) -> bool {
            false
        }
    }

    #[test]
    fn test_registers_every_builtin() {
        let registry = StrategyRegistry::new();
        for kind in StrategyKind::ALL {
            assert!(registry.has(kind.as_str()), "missing {}", kind);
        }
        assert_eq!(registry.names().len(), StrategyKind::ALL.len());
    }

    #[test]
    fn test_require_unknown() {
        let registry = StrategyRegistry::new();
        assert!(registry.require("simple").is_ok());
        assert!(matches!(
            registry.require("lottery"),
            Err(ToggleError::UnknownStrategy(name)) if name == "lottery"
        ));
    }

    #[test]
    fn test_evaluate_dispatch() {
        let registry = StrategyRegistry::new();
        let context = EvaluationContext::new().with_user_id("u1");

        assert!(registry.evaluate(&FlagConfig::for_strategy("simple"), &context));
        assert!(!registry.evaluate(&FlagConfig::for_strategy("lottery"), &context));
        assert!(!registry.evaluate(&FlagConfig::new(), &context));
    }

    #[test]
    fn test_kill_switch() {
        let registry = StrategyRegistry::new();
        let context = EvaluationContext::new();
        let config = FlagConfig::for_strategy("simple").with("enabled", false);
        assert!(!registry.evaluate(&config, &context));
        let config = FlagConfig::for_strategy("simple").with("enabled", true);
        assert!(registry.evaluate(&config, &context));
    }

    #[test]
    fn test_segments_are_wired() {
        let repository = InMemorySegmentRepository::new()
            .with_segment(StaticSegment::new("beta", ["u1"]));
        let registry = StrategyRegistry::builder()
            .segments(Arc::new(repository))
            .build();
        let config = FlagConfig::for_strategy("segment").with("segments", json!(["beta"]));

        assert!(registry.evaluate(&config, &EvaluationContext::new().with_user_id("u1")));
        assert!(!registry.evaluate(&config, &EvaluationContext::new().with_user_id("u2")));
    }

    #[test]
    fn test_extra_strategy_visible_to_composite() {
        let registry = StrategyRegistry::builder()
            .with_strategy(Arc::new(AlwaysOff))
            .build();
        let config = FlagConfig::for_strategy("composite").with(
            "strategies",
            json!([{"type": "simple"}, {"type": "always_off"}]),
        );

        assert!(registry.has("always_off"));
        assert!(!registry.evaluate(&config, &EvaluationContext::new()));
    }

    /// Claims the `composite` name and enables everything
    struct AlwaysOnComposite;

    impl Strategy for AlwaysOnComposite {
        fn name(&self) -> &str {
            "composite"
        }

        fn is_enabled(&self, _config: &FlagConfig, _context: &EvaluationContext) -> bool {
            true
        }
    }

    #[test]
    fn test_builtin_composite_cannot_be_replaced() {
        let registry = StrategyRegistry::builder()
            .with_strategy(Arc::new(AlwaysOnComposite))
            .build();
        let config = FlagConfig::for_strategy("composite")
            .with("strategies", json!([{"type": "user_id", "whitelist": ["u1"]}]));

        assert_eq!(registry.names().len(), StrategyKind::ALL.len());
        assert!(!registry.evaluate(&config, &EvaluationContext::new()));

        // Nested composites resolve to the built-in as well
        let nested = FlagConfig::for_strategy("composite").with(
            "strategies",
            json!([{
                "type": "composite",
                "operator": "OR",
                "strategies": [{"type": "user_id", "whitelist": ["u1"]}]
            }]),
        );
        assert!(!registry.evaluate(&nested, &EvaluationContext::new()));
    }

    #[test]
    fn test_nested_composite_resolves_all_types() {
        let registry = StrategyRegistry::new();
        let config = FlagConfig::for_strategy("composite").with("operator", "OR").with(
            "strategies",
            json!([
                {"type": "ip", "ip_ranges": ["10.0.0.0/8"]},
                {
                    "type": "composite",
                    "strategies": [
                        {"type": "geo", "countries": ["US"]},
                        {"type": "progressive_rollout", "schedule": [
                            {"percentage": 100, "start_date": "2020-01-01"}
                        ]}
                    ]
                }
            ]),
        );

        let internal = EvaluationContext::new().with_ip_address("10.1.2.3");
        let us_user = EvaluationContext::new()
            .with_ip_address("8.8.8.8")
            .with_country("US")
            .with_user_id("u1");
        let fr_user = EvaluationContext::new()
            .with_ip_address("8.8.8.8")
            .with_country("FR")
            .with_user_id("u1");

        assert!(registry.evaluate(&config, &internal));
        assert!(registry.evaluate(&config, &us_user));
        assert!(!registry.evaluate(&config, &fr_user));
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StrategyRegistry>();
    }
}
