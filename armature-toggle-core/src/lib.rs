//! Feature Toggle Strategies for Armature
//!
//! Decides whether a feature is on for a single request. A flag's
//! declarative configuration names a strategy; the strategy turns that
//! configuration plus the request's context into a boolean.
//!
//! # Features
//!
//! - **Consistent rollout** - CRC32 / MD5 / SHA-256 bucketing over 100,000 buckets
//! - **Targeting** - user ids, IP addresses and CIDR ranges, geography, custom attributes
//! - **Scheduling** - date windows and progressive percentage ramps
//! - **Segments** - named user sets behind a pluggable repository
//! - **Composition** - nested AND/OR combinations of any strategy
//! - **Fail-closed** - malformed input disables a feature instead of erroring
//!
//! # Quick Start
//!
//! ```
//! use armature_toggle_core::*;
//!
//! let registry = StrategyRegistry::new();
//!
//! // Roll out to 25% of users
//! let flag = FlagConfig::for_strategy("percentage").with("percentage", 25);
//! let context = EvaluationContext::new().with_user_id("user-123");
//!
//! let enabled = registry.evaluate(&flag, &context);
//! assert_eq!(enabled, registry.evaluate(&flag, &context));
//! ```
//!
//! # Composite Flags
//!
//! ```
//! use armature_toggle_core::*;
//! use serde_json::json;
//!
//! let registry = StrategyRegistry::new();
//!
//! let flag = FlagConfig::from_value(json!({
//!     "strategy": "composite",
//!     "operator": "AND",
//!     "strategies": [
//!         {"type": "geo", "countries": ["US", "CA"]},
//!         {"type": "custom_attribute", "rules": [
//!             {"attribute": "plan", "operator": "in", "value": ["pro", "enterprise"]}
//!         ]}
//!     ]
//! }))
//! .unwrap();
//!
//! let context = EvaluationContext::new()
//!     .with_country("us")
//!     .with_attribute("plan", "pro");
//!
//! assert!(registry.evaluate(&flag, &context));
//! ```
//!
//! # Segments
//!
//! ```
//! use armature_toggle_core::*;
//! use std::sync::Arc;
//! use serde_json::json;
//!
//! let segments = InMemorySegmentRepository::new()
//!     .with_segment(StaticSegment::new("beta-testers", ["user-1", "user-2"]));
//!
//! let registry = StrategyRegistry::builder()
//!     .segments(Arc::new(segments))
//!     .build();
//!
//! let flag = FlagConfig::for_strategy("segment").with("segments", json!(["beta-testers"]));
//! assert!(registry.evaluate(&flag, &EvaluationContext::new().with_user_id("user-1")));
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod hash;
pub mod logger;
pub mod operators;
pub mod registry;
pub mod rule;
pub mod segment;
pub mod strategies;
pub mod time;

pub use config::ToggleConfig;
pub use context::{EvaluationContext, FlagConfig};
pub use error::{Result, ToggleError};
pub use hash::{BUCKET_COUNT, HashAlgorithm, HashCalculator};
pub use logger::{LogFields, Logger, SharedLogger, TracingLogger};
pub use operators::Operator;
pub use registry::{StrategyRegistry, StrategyRegistryBuilder};
pub use rule::Rule;
pub use segment::{
    DynamicSegment, InMemorySegmentRepository, Segment, SegmentRepository, StaticSegment,
};
pub use strategies::{
    CompositeStrategy, CustomAttributeStrategy, DateRangeStrategy, GeoStrategy, IpStrategy,
    MAX_NESTING_DEPTH, PercentageStrategy, ProgressiveRolloutStrategy, SegmentStrategy,
    SimpleStrategy, Strategy, StrategyKind, UserIdStrategy,
};
