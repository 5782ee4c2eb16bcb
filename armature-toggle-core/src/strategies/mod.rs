//! Activation strategies
//!
//! Each strategy is a pure predicate over a flag configuration and an
//! evaluation context:
//!
//! - **Simple**: always enabled
//! - **UserId**: whitelist / blacklist of user ids
//! - **Percentage**: consistent-hash rollout
//! - **DateRange**: inclusive calendar window
//! - **Geo**: country / region / city targeting
//! - **Ip**: exact addresses and CIDR ranges
//! - **CustomAttribute**: AND of attribute rules
//! - **Segment**: membership in named user segments
//! - **ProgressiveRollout**: scheduled percentage ramp
//! - **Composite**: AND/OR over nested strategies
//!
//! Strategies never fail. Bad or missing input yields a deterministic
//! boolean, `false` unless a strategy documents otherwise.

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

pub use composite::{CompositeStrategy, MAX_NESTING_DEPTH};
pub use custom_attribute::CustomAttributeStrategy;
pub use date_range::DateRangeStrategy;
pub use geo::{GEO_CATEGORIES, GeoStrategy};
pub use ip::{Cidr, IpStrategy, parse_ip};
pub use percentage::{DEFAULT_STICKINESS, PercentageStrategy, stickiness_attributes};
pub use progressive_rollout::{ProgressiveRolloutStrategy, ScheduleStage};
pub use segment::SegmentStrategy;
pub use simple::SimpleStrategy;
pub use user_id::UserIdStrategy;

use crate::context::{EvaluationContext, FlagConfig};

/// A named activation rule.
pub trait Strategy: Send + Sync {
    /// Name used as the `strategy` / `type` dispatch key
    fn name(&self) -> &str;

    /// Whether the feature is on for this configuration and context
    fn is_enabled(&self, config: &FlagConfig, context: &EvaluationContext) -> bool;
}

/// The built-in strategy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    Simple,
    UserId,
    Percentage,
    DateRange,
    Geo,
    Ip,
    CustomAttribute,
    Segment,
    ProgressiveRollout,
    Composite,
}

impl StrategyKind {
    /// All built-in kinds
    pub const ALL: [StrategyKind; 10] = [
        Self::Simple,
        Self::UserId,
        Self::Percentage,
        Self::DateRange,
        Self::Geo,
        Self::Ip,
        Self::CustomAttribute,
        Self::Segment,
        Self::ProgressiveRollout,
        Self::Composite,
    ];

    /// Parse a wire name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::UserId => "user_id",
            Self::Percentage => "percentage",
            Self::DateRange => "date_range",
            Self::Geo => "geo",
            Self::Ip => "ip",
            Self::CustomAttribute => "custom_attribute",
            Self::Segment => "segment",
            Self::ProgressiveRollout => "progressive_rollout",
            Self::Composite => "composite",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
