use super::{Strategy, StrategyKind};
use crate::context::{EvaluationContext, FlagConfig};

/// Always enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleStrategy;

impl SimpleStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for SimpleStrategy {
    fn name(&self) -> &str {
        StrategyKind::Simple.as_str()
    }

    fn is_enabled(&self, _config: &FlagConfig, _context: &EvaluationContext) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_enabled() {
        let strategy = SimpleStrategy::new();
        assert!(strategy.is_enabled(&FlagConfig::new(), &EvaluationContext::new()));
        assert_eq!(strategy.name(), "simple");
    }
}
