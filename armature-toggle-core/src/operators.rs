//! Comparison operators for attribute rules
//!
//! Every operator is a pure `(actual, expected) -> bool` predicate. Type
//! mismatches, non-numeric comparisons and malformed patterns all yield
//! `false`; nothing here panics or returns an error.

use crate::context::numeric_value;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// `/pattern/flags` delimited form
static DELIMITED_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(?s)(.*)/([imsxuU]*)$").expect("static pattern compiles"));

// Compiled rule patterns, including the ones that failed to compile
static PATTERN_CACHE: Lazy<DashMap<String, Option<Regex>>> = Lazy::new(DashMap::new);

const PATTERN_CACHE_CAPACITY: usize = 1024;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Regex,
}

impl Operator {
    /// All operators, in wire-name order
    pub const ALL: [Operator; 13] = [
        Self::Equals,
        Self::NotEquals,
        Self::In,
        Self::NotIn,
        Self::GreaterThan,
        Self::GreaterThanOrEquals,
        Self::LessThan,
        Self::LessThanOrEquals,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::EndsWith,
        Self::Regex,
    ];

    /// Parse a wire name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::GreaterThan => "greater_than",
            Self::GreaterThanOrEquals => "greater_than_or_equals",
            Self::LessThan => "less_than",
            Self::LessThanOrEquals => "less_than_or_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Regex => "regex",
        }
    }

    /// Whether the expected value must be an array
    pub fn expects_list(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    /// Whether both operands must be numeric
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::GreaterThanOrEquals | Self::LessThan | Self::LessThanOrEquals
        )
    }

    /// Whether both operands must be strings
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Contains | Self::NotContains | Self::StartsWith | Self::EndsWith | Self::Regex
        )
    }

    /// Apply the operator
    pub fn apply(&self, actual: &Value, expected: &Value) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::NotEquals => actual != expected,
            Self::In => expected
                .as_array()
                .map(|items| items.contains(actual))
                .unwrap_or(false),
            Self::NotIn => expected
                .as_array()
                .map(|items| !items.contains(actual))
                .unwrap_or(true),
            Self::GreaterThan => compare_numbers(actual, expected, |a, e| a > e),
            Self::GreaterThanOrEquals => compare_numbers(actual, expected, |a, e| a >= e),
            Self::LessThan => compare_numbers(actual, expected, |a, e| a < e),
            Self::LessThanOrEquals => compare_numbers(actual, expected, |a, e| a <= e),
            Self::Contains => compare_strings(actual, expected, |a, e| a.contains(e)),
            Self::NotContains => compare_strings(actual, expected, |a, e| !a.contains(e)),
            Self::StartsWith => compare_strings(actual, expected, |a, e| a.starts_with(e)),
            Self::EndsWith => compare_strings(actual, expected, |a, e| a.ends_with(e)),
            Self::Regex => {
                compare_strings(actual, expected, |a, e| {
                    cached_pattern(e).is_some_and(|re| re.is_match(a))
                })
            }
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn compare_numbers(actual: &Value, expected: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (numeric_value(actual), numeric_value(expected)) {
        (Some(a), Some(e)) => cmp(a, e),
        _ => false,
    }
}

fn compare_strings(actual: &Value, expected: &Value, cmp: impl Fn(&str, &str) -> bool) -> bool {
    match (actual.as_str(), expected.as_str()) {
        (Some(a), Some(e)) => cmp(a, e),
        _ => false,
    }
}

/// Compile a rule pattern.
///
/// Accepts a bare pattern or the delimited `/pattern/flags` form, where
/// `flags` are translated to inline flags. Returns `None` when the pattern
/// does not compile.
pub fn compile_pattern(pattern: &str) -> Option<Regex> {
    let source = match DELIMITED_PATTERN.captures(pattern) {
        Some(caps) => {
            let body = caps.get(1).map_or("", |m| m.as_str());
            let flags: String = caps
                .get(2)
                .map_or("", |m| m.as_str())
                .chars()
                .filter(|c| *c != 'u')
                .collect();
            if flags.is_empty() {
                body.to_string()
            } else {
                format!("(?{}){}", flags, body)
            }
        }
        None => pattern.to_string(),
    };
    Regex::new(&source).ok()
}

/// [`compile_pattern`] through a process-wide cache.
///
/// The cache is cleared once it holds `PATTERN_CACHE_CAPACITY` patterns.
fn cached_pattern(pattern: &str) -> Option<Regex> {
    if let Some(entry) = PATTERN_CACHE.get(pattern) {
        return entry.value().clone();
    }

    let compiled = compile_pattern(pattern);
    if PATTERN_CACHE.len() >= PATTERN_CACHE_CAPACITY {
        PATTERN_CACHE.clear();
    }
    PATTERN_CACHE.insert(pattern.to_string(), compiled.clone());
    compiled
}
