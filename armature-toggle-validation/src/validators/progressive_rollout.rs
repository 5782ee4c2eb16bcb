use super::{check_percentage, check_rollout_hashing, check_timezone};
use crate::{StrategyValidator, ValidationResult};
use armature_toggle_core::time::parse_datetime;
use armature_toggle_core::{FlagConfig, StrategyKind};
use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::Value;

/// Validates rollout schedules.
///
/// Stages must start in strictly ascending order. A stage whose percentage
/// is lower than its predecessor's is allowed but draws a warning.
#[derive(Debug, Clone)]
pub struct ProgressiveRolloutValidator {
    default_timezone: Tz,
}

impl ProgressiveRolloutValidator {
    pub fn new(default_timezone: Tz) -> Self {
        Self { default_timezone }
    }
}

impl Default for ProgressiveRolloutValidator {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl StrategyValidator for ProgressiveRolloutValidator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ProgressiveRollout
    }

    fn validate(&self, config: &FlagConfig) -> ValidationResult {
        let mut result = ValidationResult::new();
        let tz = check_timezone(config, self.default_timezone, &mut result);

        match config.get("schedule") {
            Some(Value::Array(stages)) if !stages.is_empty() => {
                let mut previous: Option<(usize, f64, DateTime<Tz>)> = None;

                for (i, stage) in stages.iter().enumerate() {
                    let Some(stage) = stage.as_object() else {
                        result.add_error(format!("schedule[{}] must be an object", i));
                        continue;
                    };

                    let percentage = check_percentage(
                        stage.get("percentage"),
                        &format!("schedule[{}].percentage", i),
                        &mut result,
                    );
                    let start = match stage.get("start_date") {
                        None | Some(Value::Null) => {
                            result.add_error(format!("schedule[{}].start_date is required", i));
                            None
                        }
                        Some(raw) => {
                            let parsed = parse_datetime(raw, tz);
                            if parsed.is_none() {
                                result.add_error(format!(
                                    "schedule[{}].start_date is not a valid date: {}",
                                    i, raw
                                ));
                            }
                            parsed
                        }
                    };

                    let (Some(percentage), Some(start)) = (percentage, start) else {
                        continue;
                    };
                    if let Some((j, prev_percentage, prev_start)) = &previous {
                        if start <= *prev_start {
                            result.add_error(format!(
                                "schedule[{}].start_date must be after schedule[{}].start_date",
                                i, j
                            ));
                        }
                        if percentage < *prev_percentage {
                            result.add_warning(format!(
                                "schedule[{}].percentage decreases from {} to {}",
                                i, prev_percentage, percentage
                            ));
                        }
                    }
                    previous = Some((i, percentage, start));
                }
            }
            _ => result.add_error("schedule must be a non-empty array"),
        }

        check_rollout_hashing(config, &mut result);
        result
    }
}
