use super::{
    CustomAttributeValidator, DateRangeValidator, GeoValidator, IpValidator, PercentageValidator,
    ProgressiveRolloutValidator, SegmentValidator, UserIdValidator,
};
use crate::{StrategyValidator, ValidationResult};
use armature_toggle_core::context::{IP_ADDRESS, USER_ID};
use armature_toggle_core::strategies::{GEO_CATEGORIES, stickiness_attributes};
use armature_toggle_core::{FlagConfig, MAX_NESTING_DEPTH, StrategyKind};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Validates composite strategies and everything nested in them.
///
/// The nesting depth of the whole tree is checked first; a tree deeper than
/// [`MAX_NESTING_DEPTH`] yields one error and nothing else is inspected.
/// Otherwise every entry is checked for a known, non-simple `type` and then
/// validated by that type's validator, with messages prefixed by the entry's
/// path (`strategies[1]: strategies[0]: ...`).
pub struct CompositeStrategyValidator {
    validators: HashMap<StrategyKind, Arc<dyn StrategyValidator>>,
}

impl CompositeStrategyValidator {
    /// Build over the validators used for nested leaf entries
    pub fn new<I>(validators: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn StrategyValidator>>,
    {
        Self {
            validators: validators
                .into_iter()
                .map(|validator| (validator.kind(), validator))
                .collect(),
        }
    }

    /// Union of the context attributes any nested strategy reads, sorted
    pub fn get_required_context(&self, config: &FlagConfig) -> Vec<String> {
        let mut keys = BTreeSet::new();
        collect_required_context(StrategyKind::Composite, config, 1, &mut keys);
        keys.into_iter().collect()
    }

    fn validate_level(&self, config: &FlagConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        match config.get("operator") {
            None | Some(Value::Null) => {}
            Some(Value::String(op))
                if op.eq_ignore_ascii_case("AND") || op.eq_ignore_ascii_case("OR") => {}
            Some(_) => result.add_error("operator must be either AND or OR"),
        }

        let entries = match config.get("strategies") {
            Some(Value::Array(entries)) if !entries.is_empty() => entries,
            _ => {
                result.add_error("strategies must be a non-empty array");
                return result;
            }
        };

        if entries.len() == 1 {
            result.add_warning("composite contains a single strategy");
        }

        for (i, entry) in entries.iter().enumerate() {
            let prefix = format!("strategies[{}]", i);
            let nested = self.validate_entry(entry);
            result.merge(nested.prefixed(&prefix));
        }

        result
    }

    fn validate_entry(&self, entry: &Value) -> ValidationResult {
        let Some(object) = entry.as_object() else {
            return ValidationResult::with_error("must be an object");
        };

        let kind = match object.get("type") {
            Some(Value::String(name)) => match StrategyKind::parse(name) {
                Some(kind) => kind,
                None => {
                    return ValidationResult::with_error(format!(
                        "unknown strategy type '{}'",
                        name
                    ));
                }
            },
            _ => return ValidationResult::with_error("type is required"),
        };

        let config = FlagConfig::from(object.clone());
        match kind {
            StrategyKind::Simple => {
                ValidationResult::with_error("simple strategy is not allowed inside a composite")
            }
            StrategyKind::Composite => self.validate_level(&config),
            kind => match self.validators.get(&kind) {
                Some(validator) => validator.validate(&config),
                None => {
                    let mut result = ValidationResult::new();
                    result.add_warning(format!("no validator registered for '{}'", kind));
                    result
                }
            },
        }
    }
}

impl Default for CompositeStrategyValidator {
    fn default() -> Self {
        Self::new([
            Arc::new(UserIdValidator::default()) as Arc<dyn StrategyValidator>,
            Arc::new(PercentageValidator),
            Arc::new(DateRangeValidator::default()),
            Arc::new(GeoValidator),
            Arc::new(IpValidator),
            Arc::new(CustomAttributeValidator),
            Arc::new(SegmentValidator::default()),
            Arc::new(ProgressiveRolloutValidator::default()),
        ])
    }
}

impl std::fmt::Debug for CompositeStrategyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.validators.keys().map(|kind| kind.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("CompositeStrategyValidator")
            .field("validators", &kinds)
            .finish()
    }
}

impl StrategyValidator for CompositeStrategyValidator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Composite
    }

    fn validate(&self, config: &FlagConfig) -> ValidationResult {
        if nesting_depth(config.as_map(), 1) > MAX_NESTING_DEPTH {
            return ValidationResult::with_error(format!(
                "Maximum nesting depth of {} exceeded",
                MAX_NESTING_DEPTH
            ));
        }
        self.validate_level(config)
    }
}

/// Deepest composite level in the tree rooted at `config`.
///
/// Descent stops as soon as the limit is passed.
fn nesting_depth(config: &Map<String, Value>, depth: usize) -> usize {
    if depth > MAX_NESTING_DEPTH {
        return depth;
    }
    config
        .get("strategies")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .filter(|entry| entry.get("type").and_then(Value::as_str) == Some("composite"))
        .map(|entry| nesting_depth(entry, depth + 1))
        .max()
        .unwrap_or(depth)
}

/// Add the context attributes a strategy of `kind` reads to `keys`.
///
/// Percentage-based strategies contribute their stickiness attributes, which
/// default to both `user_id` and `session_id`.
pub(crate) fn collect_required_context(
    kind: StrategyKind,
    config: &FlagConfig,
    depth: usize,
    keys: &mut BTreeSet<String>,
) {
    match kind {
        StrategyKind::Simple | StrategyKind::DateRange => {}
        StrategyKind::UserId | StrategyKind::Segment => {
            keys.insert(USER_ID.to_string());
        }
        StrategyKind::Percentage | StrategyKind::ProgressiveRollout => {
            keys.extend(stickiness_attributes(config));
        }
        StrategyKind::Geo => {
            for (field, attribute) in GEO_CATEGORIES {
                if config.get_non_empty_array(field).is_some() {
                    keys.insert(attribute.to_string());
                }
            }
        }
        StrategyKind::Ip => {
            keys.insert(IP_ADDRESS.to_string());
        }
        StrategyKind::CustomAttribute => {
            let attributes = config
                .get_array("rules")
                .into_iter()
                .flatten()
                .filter_map(|rule| rule.get("attribute").and_then(Value::as_str))
                .filter(|attribute| !attribute.is_empty());
            keys.extend(attributes.map(str::to_string));
        }
        StrategyKind::Composite => {
            if depth > MAX_NESTING_DEPTH {
                return;
            }
            for entry in config.get_array("strategies").into_iter().flatten() {
                let Some(object) = entry.as_object() else {
                    continue;
                };
                let Some(kind) = object
                    .get("type")
                    .and_then(Value::as_str)
                    .and_then(StrategyKind::parse)
                else {
                    continue;
                };
                collect_required_context(kind, &FlagConfig::from(object.clone()), depth + 1, keys);
            }
        }
    }
}
