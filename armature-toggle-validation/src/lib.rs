//! Configuration validation for Armature feature toggles
//!
//! Checks flag configurations before they reach the strategy engine. Every
//! problem is collected in one pass: errors block a configuration, warnings
//! point out settings that are legal but probably unintended.
//!
//! # Examples
//!
//! ## Validating a Flag
//!
//! ```
//! use armature_toggle_core::FlagConfig;
//! use armature_toggle_validation::ValidationService;
//!
//! let service = ValidationService::new();
//!
//! let config = FlagConfig::for_strategy("percentage").with("percentage", 150);
//! let result = service.validate(&config);
//!
//! assert!(!result.is_valid());
//! assert_eq!(result.errors(), ["percentage must be between 0 and 100"]);
//! ```
//!
//! ## Failing Fast
//!
//! ```
//! use armature_toggle_core::FlagConfig;
//! use armature_toggle_validation::ValidationService;
//!
//! let service = ValidationService::new();
//!
//! let err = service
//!     .validate_or_throw(&FlagConfig::for_strategy("geo"))
//!     .unwrap_err();
//! assert_eq!(err.strategy, "geo");
//! println!("{}", err);
//! ```
//!
//! ## Composite Configurations
//!
//! ```
//! use armature_toggle_core::FlagConfig;
//! use armature_toggle_validation::ValidationService;
//! use serde_json::json;
//!
//! let service = ValidationService::new();
//! let config = FlagConfig::from_value(json!({
//!     "strategy": "composite",
//!     "operator": "AND",
//!     "strategies": [
//!         {"type": "percentage", "percentage": 20},
//!         {"type": "geo", "countries": ["US", "CA"]}
//!     ]
//! }))
//! .unwrap();
//!
//! assert!(service.validate(&config).is_valid());
//! assert_eq!(
//!     service.required_context(&config),
//!     ["country", "session_id", "user_id"]
//! );
//! ```

mod errors;
mod result;
mod service;
mod traits;
pub mod validators;

pub use errors::InvalidConfigurationError;
pub use result::ValidationResult;
pub use service::{ValidationService, ValidationServiceBuilder};
pub use traits::StrategyValidator;
pub use validators::{
    CompositeStrategyValidator, CustomAttributeValidator, DateRangeValidator, GeoValidator,
    IpValidator, PercentageValidator, ProgressiveRolloutValidator, SegmentValidator,
    SimpleValidator, UserIdValidator,
};
