use super::{PercentageStrategy, Strategy, StrategyKind};
use crate::context::{EvaluationContext, FlagConfig, numeric_value};
use crate::logger::{OptionalLogger, SharedLogger};
use crate::time::{config_timezone, evaluation_now, parse_datetime};
use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::Value;

/// Config keys forwarded untouched to the percentage strategy
const FORWARDED_KEYS: [&str; 3] = ["stickiness", "hash_algorithm", "hash_seed"];

/// One step of a rollout schedule
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleStage {
    pub percentage: f64,
    pub start_date: DateTime<Tz>,
}

impl ScheduleStage {
    /// Read a stage from its configuration object
    pub fn from_value(raw: &Value, tz: Tz) -> Option<Self> {
        let object = raw.as_object()?;
        let percentage = object.get("percentage").and_then(numeric_value)?;
        let start_date = object
            .get("start_date")
            .and_then(|value| parse_datetime(value, tz))?;
        Some(Self {
            percentage,
            start_date,
        })
    }
}

/// Percentage rollout that ramps up over a schedule.
///
/// The active stage is the last one in the (chronologically ordered)
/// `schedule` whose `start_date` has passed. Before the first stage the
/// feature is off; afterwards the stage's percentage is evaluated by
/// [`PercentageStrategy`] with the same stickiness and hashing settings.
/// Malformed stages are skipped with a warning.
#[derive(Debug, Clone)]
pub struct ProgressiveRolloutStrategy {
    percentage: PercentageStrategy,
    default_timezone: Tz,
    logger: OptionalLogger,
}

impl Default for ProgressiveRolloutStrategy {
    fn default() -> Self {
        Self::new(PercentageStrategy::default(), Tz::UTC, None)
    }
}

impl ProgressiveRolloutStrategy {
    pub fn new(
        percentage: PercentageStrategy,
        default_timezone: Tz,
        logger: Option<SharedLogger>,
    ) -> Self {
        Self {
            percentage,
            default_timezone,
            logger: OptionalLogger::new(logger),
        }
    }

    /// Percentage of the stage active at `now`, if any stage has started
    pub fn active_percentage(
        &self,
        schedule: &[Value],
        tz: Tz,
        now: &DateTime<Tz>,
    ) -> Option<f64> {
        let mut active = None;
        for (index, raw) in schedule.iter().enumerate() {
            match ScheduleStage::from_value(raw, tz) {
                Some(stage) if stage.start_date <= *now => active = Some(stage.percentage),
                Some(_) => {}
                None => self.logger.warning(
                    "progressive_rollout strategy: skipping malformed stage",
                    &[("index", index.to_string())],
                ),
            }
        }
        active
    }

    fn derived_config(config: &FlagConfig, percentage: f64) -> FlagConfig {
        FORWARDED_KEYS.iter().fold(
            FlagConfig::for_strategy(StrategyKind::Percentage.as_str())
                .with("percentage", percentage),
            |derived, key| match config.get(key) {
                Some(value) => derived.with(*key, value.clone()),
                None => derived,
            },
        )
    }
}

impl Strategy for ProgressiveRolloutStrategy {
    fn name(&self) -> &str {
        StrategyKind::ProgressiveRollout.as_str()
    }

    fn is_enabled(&self, config: &FlagConfig, context: &EvaluationContext) -> bool {
        let Some(schedule) = config.get_non_empty_array("schedule") else {
            self.logger
                .debug("progressive_rollout strategy: empty schedule", &[]);
            return false;
        };

        let Some(tz) = config_timezone(config, self.default_timezone) else {
            self.logger
                .warning("progressive_rollout strategy: unknown timezone", &[]);
            return false;
        };

        let Some(now) = evaluation_now(context, tz) else {
            self.logger
                .warning("progressive_rollout strategy: unparsable current_date", &[]);
            return false;
        };

        let Some(percentage) = self.active_percentage(schedule, tz, &now) else {
            self.logger
                .debug("progressive_rollout strategy: no stage has started", &[]);
            return false;
        };

        self.percentage
            .is_enabled(&Self::derived_config(config, percentage), context)
    }
}
