//! Attribute rules
//!
//! A rule compares one context attribute against an expected value with an
//! [`Operator`]. Rule lists are always AND-combined.

use crate::context::EvaluationContext;
use crate::operators::Operator;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single `{attribute, operator, value}` rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Context attribute to read
    pub attribute: String,

    /// Comparison operator
    pub operator: Operator,

    /// Expected value (an array for `in`/`not_in`)
    pub value: Value,
}

impl Rule {
    pub fn new(attribute: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            value: value.into(),
        }
    }

    /// Read a rule from its configuration object.
    ///
    /// `values` is accepted in place of `value`. Returns `None` when the entry
    /// is not an object, lacks a string attribute, or names an unknown operator.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let object = raw.as_object()?;
        let attribute = object.get("attribute")?.as_str()?;
        let operator = Operator::parse(object.get("operator")?.as_str()?)?;
        let value = object
            .get("value")
            .or_else(|| object.get("values"))
            .cloned()
            .unwrap_or(Value::Null);

        Some(Self {
            attribute: attribute.to_string(),
            operator,
            value,
        })
    }

    /// Whether the context satisfies this rule. A missing attribute fails.
    pub fn matches(&self, context: &EvaluationContext) -> bool {
        context
            .get(&self.attribute)
            .map(|actual| self.operator.apply(actual, &self.value))
            .unwrap_or(false)
    }
}

/// Evaluate raw rule configuration: non-empty and every rule matches.
///
/// Entries that do not parse count as failed rules.
pub fn all_rules_match(rules: &[Value], context: &EvaluationContext) -> bool {
    !rules.is_empty()
        && rules
            .iter()
            .all(|raw| Rule::from_value(raw).is_some_and(|rule| rule.matches(context)))
}
