use super::check_string_list;
use crate::{StrategyValidator, ValidationResult};
use armature_toggle_core::strategies::GEO_CATEGORIES;
use armature_toggle_core::{FlagConfig, StrategyKind};
use once_cell::sync::Lazy;
use regex::Regex;

static COUNTRY_CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]{2}$").unwrap());

/// Validates geographic targeting.
///
/// Empty category arrays count as unconfigured, as they do at evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoValidator;

impl StrategyValidator for GeoValidator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Geo
    }

    fn validate(&self, config: &FlagConfig) -> ValidationResult {
        let mut result = ValidationResult::new();
        let mut configured = 0;
        let mut malformed = false;

        for (field, _) in GEO_CATEGORIES {
            if config.get(field).is_some_and(|v| !v.is_null() && !v.is_array()) {
                malformed = true;
            }
            let Some(items) = check_string_list(config, field, &mut result) else {
                continue;
            };
            if items.is_empty() {
                continue;
            }
            configured += 1;

            if field == "countries" {
                for code in items.iter().filter_map(|item| item.as_str()) {
                    if !code.is_empty() && !COUNTRY_CODE_REGEX.is_match(code) {
                        result.add_warning(format!(
                            "country '{}' is not a two-letter ISO 3166-1 code",
                            code
                        ));
                    }
                }
            }
        }

        if configured == 0 && !malformed {
            result.add_error("at least one of countries, regions or cities is required");
        }

        result
    }
}
