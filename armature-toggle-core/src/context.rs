//! Flag configuration and evaluation context
//!
//! Both are untyped string-keyed JSON maps. A [`FlagConfig`] always names its
//! `strategy` and carries strategy-specific fields; an [`EvaluationContext`]
//! holds the runtime facts a strategy reads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Context key holding the user identifier
pub const USER_ID: &str = "user_id";
/// Context key holding the session identifier
pub const SESSION_ID: &str = "session_id";
/// Context key holding the client IP address
pub const IP_ADDRESS: &str = "ip_address";
/// Context key holding the ISO country code
pub const COUNTRY: &str = "country";
/// Context key holding the region
pub const REGION: &str = "region";
/// Context key holding the city
pub const CITY: &str = "city";
/// Context key overriding "now" for date-based strategies
pub const CURRENT_DATE: &str = "current_date";

/// Declarative configuration of a single flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagConfig(Map<String, Value>);

impl FlagConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration dispatching to `strategy`
    pub fn for_strategy(strategy: impl Into<String>) -> Self {
        Self::new().with("strategy", strategy.into())
    }

    /// Build a configuration from a JSON value. Only objects qualify.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Set a field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// The strategy this configuration dispatches to
    pub fn strategy(&self) -> Option<&str> {
        self.get_str("strategy")
    }

    /// Get a raw field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a field when it is a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Get a field when it is an array
    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    /// Get a field when it is a non-empty array
    pub fn get_non_empty_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.get_array(key).filter(|items| !items.is_empty())
    }

    /// Whether a field is present (even if null)
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for FlagConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Runtime facts about the current request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationContext {
    attributes: Map<String, Value>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON value. Only objects qualify.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(attributes) => Some(Self { attributes }),
            _ => None,
        }
    }

    pub fn with_user_id(self, user_id: impl Into<Value>) -> Self {
        self.with_attribute(USER_ID, user_id)
    }

    pub fn with_session_id(self, session_id: impl Into<String>) -> Self {
        self.with_attribute(SESSION_ID, session_id.into())
    }

    pub fn with_ip_address(self, ip_address: impl Into<String>) -> Self {
        self.with_attribute(IP_ADDRESS, ip_address.into())
    }

    pub fn with_country(self, country: impl Into<String>) -> Self {
        self.with_attribute(COUNTRY, country.into())
    }

    pub fn with_region(self, region: impl Into<String>) -> Self {
        self.with_attribute(REGION, region.into())
    }

    pub fn with_city(self, city: impl Into<String>) -> Self {
        self.with_attribute(CITY, city.into())
    }

    pub fn with_current_date(self, current_date: impl Into<Value>) -> Self {
        self.with_attribute(CURRENT_DATE, current_date)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Resolve an attribute usable as an identifier: a non-empty string or a number.
    pub fn identifier(&self, key: &str) -> Option<String> {
        self.get(key).and_then(identifier_value)
    }

    pub fn user_id(&self) -> Option<String> {
        self.identifier(USER_ID)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl From<Map<String, Value>> for EvaluationContext {
    fn from(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }
}

/// Render a value as an identifier string.
///
/// Null, empty strings, booleans, arrays and objects yield `None`.
pub fn identifier_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a value as a number, accepting numeric strings.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// Parse a decimal numeric string (optional sign, fraction and exponent).
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Collect the string items of an array, skipping anything else.
pub fn string_items(items: &[Value]) -> Vec<&str> {
    items.iter().filter_map(Value::as_str).collect()
}
