use super::check_string_list;
use crate::{StrategyValidator, ValidationResult};
use armature_toggle_core::{FlagConfig, SegmentRepository, StrategyKind};
use std::sync::Arc;

/// Validates segment membership configurations.
///
/// With a repository attached, names it does not know draw a warning.
#[derive(Clone, Default)]
pub struct SegmentValidator {
    repository: Option<Arc<dyn SegmentRepository>>,
}

impl SegmentValidator {
    pub fn new(repository: Option<Arc<dyn SegmentRepository>>) -> Self {
        Self { repository }
    }
}

impl std::fmt::Debug for SegmentValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentValidator")
            .field("has_repository", &self.repository.is_some())
            .finish()
    }
}

impl StrategyValidator for SegmentValidator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Segment
    }

    fn validate(&self, config: &FlagConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(names) = check_string_list(config, "segments", &mut result) else {
            if result.is_valid() {
                result.add_error("segments must be a non-empty array");
            }
            return result;
        };
        if names.is_empty() {
            result.add_error("segments must be a non-empty array");
            return result;
        }

        if let Some(repository) = &self.repository {
            for name in names.iter().filter_map(|name| name.as_str()) {
                if !name.is_empty() && !repository.has(name) {
                    result.add_warning(format!("segment '{}' is not defined", name));
                }
            }
        }

        result
    }
}
