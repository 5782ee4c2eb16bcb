use super::{Strategy, StrategyKind};
use crate::context::{EvaluationContext, FlagConfig};
use crate::logger::{OptionalLogger, SharedLogger};
use crate::segment::SegmentRepository;
use serde_json::Value;
use std::sync::Arc;

/// Enabled when the user belongs to any of the named segments.
///
/// Unknown segment names are skipped. An empty `segments` list, a missing
/// `user_id`, or the absence of a segment repository disables the feature.
#[derive(Clone, Default)]
pub struct SegmentStrategy {
    repository: Option<Arc<dyn SegmentRepository>>,
    logger: OptionalLogger,
}

impl SegmentStrategy {
    pub fn new(
        repository: Option<Arc<dyn SegmentRepository>>,
        logger: Option<SharedLogger>,
    ) -> Self {
        Self {
            repository,
            logger: OptionalLogger::new(logger),
        }
    }
}

impl Strategy for SegmentStrategy {
    fn name(&self) -> &str {
        StrategyKind::Segment.as_str()
    }

    fn is_enabled(&self, config: &FlagConfig, context: &EvaluationContext) -> bool {
        let Some(names) = config.get_non_empty_array("segments") else {
            self.logger.debug("segment strategy: no segments configured", &[]);
            return false;
        };

        let Some(user_id) = context.user_id() else {
            self.logger.debug("segment strategy: no user_id in context", &[]);
            return false;
        };

        let Some(repository) = &self.repository else {
            self.logger
                .warning("segment strategy: no segment repository available", &[]);
            return false;
        };

        names.iter().filter_map(Value::as_str).any(|name| {
            match repository.get(name) {
                Some(segment) => segment.contains(&user_id, context),
                None => {
                    self.logger.debug(
                        "segment strategy: unknown segment skipped",
                        &[("segment", name.to_string())],
                    );
                    false
                }
            }
        })
    }
}

impl std::fmt::Debug for SegmentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentStrategy")
            .field("has_repository", &self.repository.is_some())
            .field("logger", &self.logger)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::testing::RecordingLogger;
    use crate::operators::Operator;
    use crate::rule::Rule;
    use crate::segment::{DynamicSegment, InMemorySegmentRepository, StaticSegment};
    use serde_json::json;

    fn repository() -> Arc<dyn SegmentRepository> {
        Arc::new(
            InMemorySegmentRepository::new()
                .with_segment(StaticSegment::new("beta-testers", ["u1", "u2"]))
                .with_segment(
                    DynamicSegment::new("enterprise")
                        .with_rule(Rule::new("plan", Operator::Equals, "enterprise")),
                ),
        )
    }

    fn config(segments: serde_json::Value) -> FlagConfig {
        FlagConfig::for_strategy("segment").with("segments", segments)
    }

    #[test]
    fn test_any_segment_matches() {
        let strategy = SegmentStrategy::new(Some(repository()), None);
        let config = config(json!(["beta-testers", "enterprise"]));

        assert!(strategy.is_enabled(&config, &EvaluationContext::new().with_user_id("u1")));
        assert!(strategy.is_enabled(
            &config,
            &EvaluationContext::new()
                .with_user_id("u9")
                .with_attribute("plan", "enterprise")
        ));
        assert!(!strategy.is_enabled(&config, &EvaluationContext::new().with_user_id("u9")));
    }

    #[test]
    fn test_unknown_segment_is_skipped() {
        let logger = Arc::new(RecordingLogger::default());
        let strategy = SegmentStrategy::new(Some(repository()), Some(logger.clone()));
        let config = config(json!(["missing", "beta-testers"]));

        assert!(strategy.is_enabled(&config, &EvaluationContext::new().with_user_id("u2")));
        assert_eq!(
            logger.messages("debug"),
            vec!["segment strategy: unknown segment skipped".to_string()]
        );
    }

    #[test]
    fn test_fail_closed_cases() {
        let strategy = SegmentStrategy::new(Some(repository()), None);
        let user = EvaluationContext::new().with_user_id("u1");

        assert!(!strategy.is_enabled(&config(json!([])), &user));
        assert!(!strategy.is_enabled(&FlagConfig::for_strategy("segment"), &user));
        assert!(!strategy.is_enabled(&config(json!(["beta-testers"])), &EvaluationContext::new()));

        let detached = SegmentStrategy::default();
        assert!(!detached.is_enabled(&config(json!(["beta-testers"])), &user));
    }
}
