use crate::{StrategyValidator, ValidationResult};
use armature_toggle_core::config::DEFAULT_LARGE_LIST_THRESHOLD;
use armature_toggle_core::{FlagConfig, StrategyKind};
use serde_json::Value;

/// Validates `whitelist` / `blacklist` configurations.
///
/// Lists hold user ids as strings or integers. At least one list must be
/// non-empty. Lists at or above the large-list threshold draw a warning.
#[derive(Debug, Clone)]
pub struct UserIdValidator {
    large_list_threshold: usize,
}

impl UserIdValidator {
    pub fn new(large_list_threshold: usize) -> Self {
        Self {
            large_list_threshold,
        }
    }

    /// Check one list; returns whether it is a non-empty array
    fn check_list(&self, config: &FlagConfig, field: &str, result: &mut ValidationResult) -> bool {
        let items = match config.get(field) {
            None | Some(Value::Null) => return false,
            Some(Value::Array(items)) => items,
            Some(_) => {
                result.add_error(format!("{} must be an array", field));
                return false;
            }
        };

        for (i, item) in items.iter().enumerate() {
            let usable = match item {
                Value::String(id) => !id.is_empty(),
                Value::Number(n) => n.is_i64() || n.is_u64(),
                _ => false,
            };
            if !usable {
                result.add_error(format!(
                    "{}[{}] must be a non-empty string or an integer",
                    field, i
                ));
            }
        }

        if items.len() >= self.large_list_threshold {
            result.add_warning(format!(
                "{} contains {} entries; consider using a segment instead",
                field,
                items.len()
            ));
        }

        !items.is_empty()
    }
}

impl Default for UserIdValidator {
    fn default() -> Self {
        Self::new(DEFAULT_LARGE_LIST_THRESHOLD)
    }
}

impl StrategyValidator for UserIdValidator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::UserId
    }

    fn validate(&self, config: &FlagConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        let has_whitelist = self.check_list(config, "whitelist", &mut result);
        let has_blacklist = self.check_list(config, "blacklist", &mut result);

        match (has_whitelist, has_blacklist) {
            (false, false) => {
                result.add_error("at least one of whitelist or blacklist must be a non-empty array")
            }
            (true, true) => result
                .add_warning("both whitelist and blacklist are set; the blacklist is ignored"),
            _ => {}
        }

        result
    }
}
