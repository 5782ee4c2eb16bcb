//! Error types for the toggle engine
//!
//! Evaluation itself never fails: strategies collapse bad input to `false`.
//! These errors cover engine setup and explicit registry lookups.

use thiserror::Error;

/// Result type for toggle engine operations
pub type Result<T> = std::result::Result<T, ToggleError>;

/// Toggle engine errors
#[derive(Debug, Error)]
pub enum ToggleError {
    /// Engine configuration could not be read
    #[error("Toggle configuration error: {0}")]
    Configuration(String),

    /// A strategy name is not registered
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
}

impl ToggleError {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new unknown strategy error
    pub fn unknown_strategy<S: Into<String>>(name: S) -> Self {
        Self::UnknownStrategy(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let error = ToggleError::configuration("bad timezone");
        assert_eq!(error.to_string(), "Toggle configuration error: bad timezone");

        let error = ToggleError::unknown_strategy("lottery");
        assert_eq!(error.to_string(), "Unknown strategy: lottery");
    }
}
