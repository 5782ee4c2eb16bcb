use super::{Strategy, StrategyKind};
use crate::context::{EvaluationContext, FlagConfig};
use crate::logger::{OptionalLogger, SharedLogger};
use crate::time::{RangeBound, config_timezone, evaluation_now, parse_range_bound};
use chrono_tz::Tz;
use serde_json::Value;

/// Enabled while "now" lies within `[start_date 00:00:00, end_date 23:59:59]`.
///
/// Either bound may be omitted. Dates are read in the config's `timezone`,
/// falling back to the engine default. Any unparsable date, or an unknown
/// timezone, disables the feature.
#[derive(Debug, Clone)]
pub struct DateRangeStrategy {
    default_timezone: Tz,
    logger: OptionalLogger,
}

impl Default for DateRangeStrategy {
    fn default() -> Self {
        Self::new(Tz::UTC, None)
    }
}

impl DateRangeStrategy {
    pub fn new(default_timezone: Tz, logger: Option<SharedLogger>) -> Self {
        Self {
            default_timezone,
            logger: OptionalLogger::new(logger),
        }
    }

    fn bound<'a>(&self, config: &'a FlagConfig, key: &str) -> Option<&'a Value> {
        config.get(key).filter(|value| !value.is_null())
    }
}

impl Strategy for DateRangeStrategy {
    fn name(&self) -> &str {
        StrategyKind::DateRange.as_str()
    }

    fn is_enabled(&self, config: &FlagConfig, context: &EvaluationContext) -> bool {
        let Some(tz) = config_timezone(config, self.default_timezone) else {
            self.logger
                .warning("date_range strategy: unknown timezone", &[]);
            return false;
        };

        let Some(now) = evaluation_now(context, tz) else {
            self.logger
                .warning("date_range strategy: unparsable current_date", &[]);
            return false;
        };

        if let Some(raw) = self.bound(config, "start_date") {
            match parse_range_bound(raw, tz, RangeBound::Start) {
                Some(start) if now < start => return false,
                Some(_) => {}
                None => {
                    self.logger.warning(
                        "date_range strategy: unparsable start_date",
                        &[("start_date", raw.to_string())],
                    );
                    return false;
                }
            }
        }

        if let Some(raw) = self.bound(config, "end_date") {
            match parse_range_bound(raw, tz, RangeBound::End) {
                Some(end) if now > end => return false,
                Some(_) => {}
                None => {
                    self.logger.warning(
                        "date_range strategy: unparsable end_date",
                        &[("end_date", raw.to_string())],
                    );
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn june() -> FlagConfig {
        FlagConfig::for_strategy("date_range")
            .with("start_date", "2025-06-01")
            .with("end_date", "2025-06-30")
    }

    fn at(date: &str) -> EvaluationContext {
        EvaluationContext::new().with_current_date(date)
    }

    #[test]
    fn test_inclusive_bounds() {
        let strategy = DateRangeStrategy::default();
        assert!(strategy.is_enabled(&june(), &at("2025-06-01T00:00:00")));
        assert!(strategy.is_enabled(&june(), &at("2025-06-15 12:00:00")));
        assert!(strategy.is_enabled(&june(), &at("2025-06-30T23:59:59")));
        assert!(!strategy.is_enabled(&june(), &at("2025-07-01T00:00:00")));
        assert!(!strategy.is_enabled(&june(), &at("2025-05-31T23:59:59")));
    }

    #[test]
    fn test_bounds_snap_to_whole_days() {
        let config = FlagConfig::for_strategy("date_range")
            .with("start_date", "2025-06-01 18:00:00")
            .with("end_date", "2025-06-01 06:00:00");
        let strategy = DateRangeStrategy::default();
        assert!(strategy.is_enabled(&config, &at("2025-06-01 12:00:00")));
    }

    #[test]
    fn test_open_ended_ranges() {
        let strategy = DateRangeStrategy::default();
        let from = FlagConfig::for_strategy("date_range").with("start_date", "2025-06-01");
        let until = FlagConfig::for_strategy("date_range").with("end_date", "2025-06-30");

        assert!(strategy.is_enabled(&from, &at("2030-01-01")));
        assert!(!strategy.is_enabled(&from, &at("2025-05-01")));
        assert!(strategy.is_enabled(&until, &at("2020-01-01")));
        assert!(!strategy.is_enabled(&until, &at("2025-07-01")));
    }

    #[test]
    fn test_unparsable_dates_fail_closed() {
        let strategy = DateRangeStrategy::default();
        let bad_start = FlagConfig::for_strategy("date_range").with("start_date", "soon");
        assert!(!strategy.is_enabled(&bad_start, &at("2025-06-10")));
        assert!(!strategy.is_enabled(&june(), &at("not a date")));
    }

    #[test]
    fn test_timezone() {
        let strategy = DateRangeStrategy::default();
        let tokyo = june().with("timezone", "Asia/Tokyo");

        // 2025-05-31T16:00Z is 2025-06-01 01:00 in Tokyo
        assert!(strategy.is_enabled(&tokyo, &at("2025-05-31T16:00:00Z")));
        assert!(!strategy.is_enabled(&june(), &at("2025-05-31T16:00:00Z")));

        let unknown = june().with("timezone", "Nowhere/Land");
        assert!(!strategy.is_enabled(&unknown, &at("2025-06-10")));
    }

    #[test]
    fn test_start_on_dst_gap_day() {
        let strategy = DateRangeStrategy::default();
        let config = FlagConfig::for_strategy("date_range")
            .with("start_date", "2024-09-08")
            .with("end_date", "2024-09-30")
            .with("timezone", "America/Santiago");

        assert!(strategy.is_enabled(&config, &at("2024-09-15T12:00:00Z")));
        assert!(strategy.is_enabled(&config, &at("2024-09-08T04:00:00Z")));
        assert!(!strategy.is_enabled(&config, &at("2024-09-08T03:59:59Z")));
    }

    #[test]
    fn test_default_timezone() {
        let strategy = DateRangeStrategy::new(Tz::Asia__Tokyo, None);
        assert!(strategy.is_enabled(&june(), &at("2025-05-31T16:00:00Z")));
    }
}
