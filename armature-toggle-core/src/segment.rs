//! User segments
//!
//! A segment is a named, externally managed set of users. The segment
//! strategy only talks to the [`SegmentRepository`] trait; the in-memory
//! implementations here cover static user lists and rule-derived segments.

use crate::context::EvaluationContext;
use crate::rule::Rule;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A named set of users.
pub trait Segment: Send + Sync {
    /// Segment name
    fn name(&self) -> &str;

    /// Segment kind, e.g. `static` or `dynamic`
    fn segment_type(&self) -> &str;

    /// Whether the user belongs to the segment
    fn contains(&self, user_id: &str, context: &EvaluationContext) -> bool;
}

/// Read-only segment lookup.
///
/// Implementations must be side-effect free from the caller's point of view
/// and safe to share between threads.
pub trait SegmentRepository: Send + Sync {
    fn get(&self, name: &str) -> Option<Arc<dyn Segment>>;

    fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn names(&self) -> Vec<String>;
}

/// Segment backed by an explicit list of user ids
#[derive(Debug, Clone)]
pub struct StaticSegment {
    name: String,
    user_ids: HashSet<String>,
}

impl StaticSegment {
    pub fn new<I, S>(name: impl Into<String>, user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            user_ids: user_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.user_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }
}

impl Segment for StaticSegment {
    fn name(&self) -> &str {
        &self.name
    }

    fn segment_type(&self) -> &str {
        "static"
    }

    fn contains(&self, user_id: &str, _context: &EvaluationContext) -> bool {
        self.user_ids.contains(user_id)
    }
}

/// Segment whose members satisfy every rule against the evaluation context
#[derive(Debug, Clone)]
pub struct DynamicSegment {
    name: String,
    rules: Vec<Rule>,
}

impl DynamicSegment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl Segment for DynamicSegment {
    fn name(&self) -> &str {
        &self.name
    }

    fn segment_type(&self) -> &str {
        "dynamic"
    }

    // A segment without rules has no members
    fn contains(&self, _user_id: &str, context: &EvaluationContext) -> bool {
        !self.rules.is_empty() && self.rules.iter().all(|rule| rule.matches(context))
    }
}

/// Segment repository assembled once and read afterwards
#[derive(Clone, Default)]
pub struct InMemorySegmentRepository {
    segments: HashMap<String, Arc<dyn Segment>>,
}

impl InMemorySegmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a segment, replacing any segment with the same name
    pub fn with_segment(mut self, segment: impl Segment + 'static) -> Self {
        self.segments
            .insert(segment.name().to_string(), Arc::new(segment));
        self
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl SegmentRepository for InMemorySegmentRepository {
    fn get(&self, name: &str) -> Option<Arc<dyn Segment>> {
        self.segments.get(name).cloned()
    }

    fn has(&self, name: &str) -> bool {
        self.segments.contains_key(name)
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.segments.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for InMemorySegmentRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySegmentRepository")
            .field("segments", &self.names())
            .finish()
    }
}
