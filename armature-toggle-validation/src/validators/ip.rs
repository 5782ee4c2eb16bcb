use crate::{StrategyValidator, ValidationResult};
use armature_toggle_core::strategies::{Cidr, parse_ip};
use armature_toggle_core::{FlagConfig, StrategyKind};
use serde_json::Value;

/// Validates IP whitelists and CIDR ranges
#[derive(Debug, Clone, Copy, Default)]
pub struct IpValidator;

/// Check one list, with `valid` deciding each entry; returns whether it is non-empty
fn check_entries(
    config: &FlagConfig,
    field: &str,
    what: &str,
    valid: impl Fn(&str) -> bool,
    result: &mut ValidationResult,
) -> bool {
    let items = match config.get(field) {
        None | Some(Value::Null) => return false,
        Some(Value::Array(items)) => items,
        Some(_) => {
            result.add_error(format!("{} must be an array", field));
            return false;
        }
    };

    for (i, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(raw) if valid(raw) => {}
            Some(raw) => {
                result.add_error(format!("{}[{}] is not a valid {}: {}", field, i, what, raw))
            }
            None => result.add_error(format!("{}[{}] must be a string", field, i)),
        }
    }

    !items.is_empty()
}

impl StrategyValidator for IpValidator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Ip
    }

    fn validate(&self, config: &FlagConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        let has_whitelist = check_entries(
            config,
            "whitelist",
            "IP address",
            |raw| parse_ip(raw).is_some(),
            &mut result,
        );
        let has_ranges = check_entries(
            config,
            "ip_ranges",
            "CIDR range",
            |raw| Cidr::parse(raw).is_some(),
            &mut result,
        );

        if !has_whitelist && !has_ranges {
            result.add_error("at least one of whitelist or ip_ranges is required");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(value: serde_json::Value) -> ValidationResult {
        IpValidator.validate(&FlagConfig::from_value(value).unwrap())
    }

    #[test]
    fn test_valid_lists() {
        let result = validate(json!({
            "strategy": "ip",
            "whitelist": ["10.0.0.1", "::1"],
            "ip_ranges": ["192.168.0.0/16", "2001:db8::/32", "172.16.0.5"]
        }));
        assert!(result.is_valid());
    }

    #[test]
    fn test_requires_a_list() {
        assert_eq!(
            validate(json!({"strategy": "ip", "whitelist": []})).errors(),
            ["at least one of whitelist or ip_ranges is required"]
        );
    }

    #[test]
    fn test_invalid_entries() {
        let result = validate(json!({
            "whitelist": ["10.0.0.256", 7],
            "ip_ranges": ["10.0.0.0/33", "::/129", "10.0.0.0/8"]
        }));
        assert_eq!(
            result.errors(),
            [
                "whitelist[0] is not a valid IP address: 10.0.0.256",
                "whitelist[1] must be a string",
                "ip_ranges[0] is not a valid CIDR range: 10.0.0.0/33",
                "ip_ranges[1] is not a valid CIDR range: ::/129"
            ]
        );
    }
}
