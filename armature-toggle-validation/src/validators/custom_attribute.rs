use crate::{StrategyValidator, ValidationResult};
use armature_toggle_core::context::numeric_value;
use armature_toggle_core::operators::compile_pattern;
use armature_toggle_core::{FlagConfig, Operator, StrategyKind};
use serde_json::Value;

/// Validates custom attribute rule lists.
///
/// Each rule must carry an attribute, a known operator and a value whose
/// shape suits the operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomAttributeValidator;

fn check_rule(index: usize, rule: &Value, result: &mut ValidationResult) {
    let Some(rule) = rule.as_object() else {
        result.add_error(format!("rules[{}] must be an object", index));
        return;
    };

    if !rule
        .get("attribute")
        .and_then(Value::as_str)
        .is_some_and(|attribute| !attribute.is_empty())
    {
        result.add_error(format!("rules[{}].attribute must be a non-empty string", index));
    }

    let operator = match rule.get("operator") {
        None | Some(Value::Null) => {
            result.add_error(format!("rules[{}].operator is required", index));
            None
        }
        Some(Value::String(name)) => {
            let operator = Operator::parse(name);
            if operator.is_none() {
                result.add_error(format!(
                    "rules[{}].operator '{}' is not supported",
                    index, name
                ));
            }
            operator
        }
        Some(_) => {
            result.add_error(format!("rules[{}].operator must be a string", index));
            None
        }
    };

    let Some(value) = rule.get("value").or_else(|| rule.get("values")) else {
        result.add_error(format!("rules[{}].value is required", index));
        return;
    };
    let Some(operator) = operator else {
        return;
    };

    if operator.expects_list() && !value.is_array() {
        result.add_error(format!(
            "rules[{}].value must be an array for operator '{}'",
            index,
            operator.as_str()
        ));
    } else if operator.is_numeric() && numeric_value(value).is_none() {
        result.add_error(format!(
            "rules[{}].value must be numeric for operator '{}'",
            index,
            operator.as_str()
        ));
    } else if operator.is_textual() {
        match value.as_str() {
            None => result.add_error(format!(
                "rules[{}].value must be a string for operator '{}'",
                index,
                operator.as_str()
            )),
            Some(pattern) if operator == Operator::Regex && compile_pattern(pattern).is_none() => {
                result.add_error(format!(
                    "rules[{}].value is not a valid regular expression: {}",
                    index, pattern
                ))
            }
            Some(_) => {}
        }
    }
}

impl StrategyValidator for CustomAttributeValidator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CustomAttribute
    }

    fn validate(&self, config: &FlagConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        match config.get("rules") {
            Some(Value::Array(rules)) if !rules.is_empty() => {
                for (i, rule) in rules.iter().enumerate() {
                    check_rule(i, rule, &mut result);
                }
            }
            _ => result.add_error("rules must be a non-empty array"),
        }

        result
    }
}
