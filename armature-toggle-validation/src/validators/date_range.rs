use super::check_timezone;
use crate::{StrategyValidator, ValidationResult};
use armature_toggle_core::time::{RangeBound, parse_range_bound};
use armature_toggle_core::{FlagConfig, StrategyKind};
use chrono::Utc;
use chrono_tz::Tz;
use serde_json::Value;

/// Validates date range windows.
///
/// Bounds are parsed exactly as the strategy parses them, in the configured
/// (or default) timezone and snapped to the start or end of their day.
#[derive(Debug, Clone)]
pub struct DateRangeValidator {
    default_timezone: Tz,
}

impl DateRangeValidator {
    pub fn new(default_timezone: Tz) -> Self {
        Self { default_timezone }
    }
}

impl Default for DateRangeValidator {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

fn bound<'a>(config: &'a FlagConfig, field: &str) -> Option<&'a Value> {
    config.get(field).filter(|value| !value.is_null())
}

impl StrategyValidator for DateRangeValidator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DateRange
    }

    fn validate(&self, config: &FlagConfig) -> ValidationResult {
        let mut result = ValidationResult::new();
        let tz = check_timezone(config, self.default_timezone, &mut result);

        let start_raw = bound(config, "start_date");
        let end_raw = bound(config, "end_date");
        if start_raw.is_none() && end_raw.is_none() {
            result.add_error("at least one of start_date or end_date is required");
            return result;
        }

        let mut parse = |field: &str, raw: Option<&Value>, which: RangeBound| {
            let raw = raw?;
            let parsed = parse_range_bound(raw, tz, which);
            if parsed.is_none() {
                result.add_error(format!("{} is not a valid date: {}", field, raw));
            }
            parsed
        };
        let start = parse("start_date", start_raw, RangeBound::Start);
        let end = parse("end_date", end_raw, RangeBound::End);

        if let (Some(start), Some(end)) = (&start, &end)
            && start > end
        {
            result.add_error("start_date must not be after end_date");
        }

        if let Some(end) = &end
            && end.with_timezone(&Utc) < Utc::now()
        {
            result.add_warning("end_date is in the past; the feature will never be enabled");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(value: serde_json::Value) -> ValidationResult {
        DateRangeValidator::default().validate(&FlagConfig::from_value(value).unwrap())
    }

    #[test]
    fn test_open_ended_range() {
        let result = validate(json!({"strategy": "date_range", "start_date": "2025-06-01"}));
        assert!(result.is_valid());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_requires_a_bound() {
        let result = validate(json!({"strategy": "date_range", "end_date": null}));
        assert_eq!(result.errors(), ["at least one of start_date or end_date is required"]);
    }

    #[test]
    fn test_unparsable_bound() {
        let result = validate(json!({"start_date": "first of june", "end_date": "2999-01-01"}));
        assert_eq!(result.errors(), [r#"start_date is not a valid date: "first of june""#]);
    }

    #[test]
    fn test_bound_on_dst_gap_day() {
        let result = validate(json!({
            "start_date": "2024-09-08",
            "end_date": "2999-09-30",
            "timezone": "America/Santiago"
        }));
        assert!(result.is_valid());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_inverted_range() {
        let result = validate(json!({"start_date": "2999-07-01", "end_date": "2999-06-01"}));
        assert_eq!(result.errors(), ["start_date must not be after end_date"]);
    }

    #[test]
    fn test_same_day_range_is_valid() {
        let result = validate(json!({"start_date": "2999-07-01", "end_date": "2999-07-01"}));
        assert!(result.is_valid());
    }

    #[test]
    fn test_past_range_warns() {
        let result = validate(json!({"start_date": "2000-01-01", "end_date": "2000-01-31"}));
        assert!(result.is_valid());
        assert_eq!(
            result.warnings(),
            ["end_date is in the past; the feature will never be enabled"]
        );
    }

    #[test]
    fn test_invalid_timezone() {
        let result = validate(json!({"start_date": "2025-06-01", "timezone": "Nowhere/City"}));
        assert_eq!(result.errors(), ["timezone 'Nowhere/City' is not a valid IANA timezone"]);
    }
}
