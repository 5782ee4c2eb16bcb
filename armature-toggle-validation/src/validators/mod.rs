// Built-in strategy validators

mod composite;
mod custom_attribute;
mod date_range;
mod geo;
mod ip;
mod percentage;
mod progressive_rollout;
mod segment;
mod simple;
mod user_id;

pub use composite::CompositeStrategyValidator;
pub(crate) use composite::collect_required_context;
pub use custom_attribute::CustomAttributeValidator;
pub use date_range::DateRangeValidator;
pub use geo::GeoValidator;
pub use ip::IpValidator;
pub use percentage::PercentageValidator;
pub use progressive_rollout::ProgressiveRolloutValidator;
pub use segment::SegmentValidator;
pub use simple::SimpleValidator;
pub use user_id::UserIdValidator;

use crate::ValidationResult;
use armature_toggle_core::context::numeric_value;
use armature_toggle_core::time::parse_timezone;
use armature_toggle_core::{FlagConfig, HashAlgorithm};
use chrono_tz::Tz;
use serde_json::Value;

/// Check a required percentage field; returns the value when it is usable
pub(crate) fn check_percentage(
    value: Option<&Value>,
    field: &str,
    result: &mut ValidationResult,
) -> Option<f64> {
    let value = match value {
        None | Some(Value::Null) => {
            result.add_error(format!("{} is required", field));
            return None;
        }
        Some(value) => value,
    };

    let Some(percentage) = numeric_value(value) else {
        result.add_error(format!("{} must be a number", field));
        return None;
    };

    if !(0.0..=100.0).contains(&percentage) {
        result.add_error(format!("{} must be between 0 and 100", field));
        return None;
    }

    Some(percentage)
}

/// Check `stickiness`, `hash_algorithm` and `hash_seed` of a rollout config
pub(crate) fn check_rollout_hashing(config: &FlagConfig, result: &mut ValidationResult) {
    match config.get("stickiness") {
        None | Some(Value::Null) => {}
        Some(Value::String(attribute)) if !attribute.is_empty() => {}
        Some(Value::Array(items))
            if !items.is_empty()
                && items
                    .iter()
                    .all(|item| item.as_str().is_some_and(|s| !s.is_empty())) => {}
        Some(_) => result.add_error(
            "stickiness must be a non-empty string or a non-empty array of non-empty strings",
        ),
    }

    match config.get("hash_algorithm") {
        None | Some(Value::Null) => {}
        Some(Value::String(name)) if HashAlgorithm::parse(name).is_some() => {}
        Some(_) => {
            let known: Vec<&str> = HashAlgorithm::ALL.iter().map(|a| a.as_str()).collect();
            result.add_error(format!("hash_algorithm must be one of: {}", known.join(", ")));
        }
    }

    match config.get("hash_seed") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => result.add_error("hash_seed must be a string"),
    }
}

/// Check the optional `timezone` field.
///
/// Returns the timezone later checks should parse dates in; an invalid name
/// is reported and `default` is used instead.
pub(crate) fn check_timezone(
    config: &FlagConfig,
    default: Tz,
    result: &mut ValidationResult,
) -> Tz {
    match config.get("timezone") {
        None | Some(Value::Null) => default,
        Some(Value::String(name)) => parse_timezone(name).unwrap_or_else(|| {
            result.add_error(format!("timezone '{}' is not a valid IANA timezone", name));
            default
        }),
        Some(_) => {
            result.add_error("timezone must be a string");
            default
        }
    }
}

/// Check an optional array of non-empty strings.
///
/// Returns the array when the field is present and is an array, even if some
/// entries were reported.
pub(crate) fn check_string_list<'a>(
    config: &'a FlagConfig,
    field: &str,
    result: &mut ValidationResult,
) -> Option<&'a Vec<Value>> {
    match config.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                if !item.as_str().is_some_and(|s| !s.is_empty()) {
                    result.add_error(format!("{}[{}] must be a non-empty string", field, i));
                }
            }
            Some(items)
        }
        Some(_) => {
            result.add_error(format!("{} must be an array of strings", field));
            None
        }
    }
}
