use super::{Strategy, StrategyKind};
use crate::context::{EvaluationContext, FlagConfig, identifier_value};
use crate::logger::{OptionalLogger, SharedLogger};
use serde_json::Value;

/// Enables a feature for whitelisted users, or for everyone not blacklisted.
///
/// A non-empty `whitelist` takes precedence and the blacklist is then
/// ignored. With neither list configured every identified user is enabled.
/// A context without `user_id` is always disabled.
#[derive(Debug, Clone, Default)]
pub struct UserIdStrategy {
    logger: OptionalLogger,
}

impl UserIdStrategy {
    pub fn new(logger: Option<SharedLogger>) -> Self {
        Self {
            logger: OptionalLogger::new(logger),
        }
    }
}

impl Strategy for UserIdStrategy {
    fn name(&self) -> &str {
        StrategyKind::UserId.as_str()
    }

    fn is_enabled(&self, config: &FlagConfig, context: &EvaluationContext) -> bool {
        let Some(user_id) = context.user_id() else {
            self.logger.debug("user_id strategy: no user_id in context", &[]);
            return false;
        };

        if let Some(whitelist) = config.get_non_empty_array("whitelist") {
            return list_contains(whitelist, &user_id);
        }

        if let Some(blacklist) = config.get_non_empty_array("blacklist") {
            return !list_contains(blacklist, &user_id);
        }

        true
    }
}

fn list_contains(list: &[Value], user_id: &str) -> bool {
    list.iter()
        .filter_map(identifier_value)
        .any(|entry| entry == user_id)
}
