// Validation errors

use crate::ValidationResult;
use thiserror::Error;

/// Raised by `validate_or_throw` when a configuration has errors.
///
/// Carries the complete result, warnings included.
#[derive(Debug, Clone, Error)]
#[error("Invalid {strategy} configuration: {}", .result.errors().join("; "))]
pub struct InvalidConfigurationError {
    /// Strategy named by the configuration (`unknown` when absent)
    pub strategy: String,

    /// The full validation result
    pub result: ValidationResult,
}

impl InvalidConfigurationError {
    pub fn new(strategy: impl Into<String>, result: ValidationResult) -> Self {
        Self {
            strategy: strategy.into(),
            result,
        }
    }

    pub fn errors(&self) -> &[String] {
        self.result.errors()
    }

    pub fn warnings(&self) -> &[String] {
        self.result.warnings()
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        let mut json = self.result.to_json();
        json["strategy"] = serde_json::Value::String(self.strategy.clone());
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_errors() {
        let mut result = ValidationResult::with_error("percentage is required");
        result.add_error("hash_algorithm must be one of: crc32, md5, sha256");
        result.add_warning("advice");

        let error = InvalidConfigurationError::new("percentage", result);
        assert_eq!(
            error.to_string(),
            "Invalid percentage configuration: percentage is required; hash_algorithm must be one of: crc32, md5, sha256"
        );
        assert_eq!(error.warnings(), ["advice"]);
        assert_eq!(error.to_json()["strategy"], "percentage");
    }
}
