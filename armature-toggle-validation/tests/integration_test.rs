//! Integration tests for armature-toggle-validation

use armature_toggle_core::{FlagConfig, InMemorySegmentRepository, StaticSegment, ToggleConfig};
use armature_toggle_validation::*;
use chrono_tz::Tz;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

fn config(value: serde_json::Value) -> FlagConfig {
    FlagConfig::from_value(value).unwrap()
}

#[test]
fn test_every_documented_shape_is_valid() {
    let service = ValidationService::new();
    let shapes = [
        json!({"strategy": "simple"}),
        json!({"strategy": "user_id", "whitelist": ["user-1", 2]}),
        json!({"strategy": "percentage", "percentage": 25, "hash_algorithm": "crc32"}),
        json!({"strategy": "date_range", "start_date": "2025-06-01", "end_date": "2999-06-30"}),
        json!({"strategy": "geo", "countries": ["US"], "regions": ["CA"], "cities": ["Fresno"]}),
        json!({"strategy": "ip", "ip_ranges": ["10.0.0.0/8"]}),
        json!({"strategy": "custom_attribute", "rules": [
            {"attribute": "plan", "operator": "equals", "value": "pro"}
        ]}),
        json!({"strategy": "segment", "segments": ["beta"]}),
        json!({"strategy": "progressive_rollout", "schedule": [
            {"percentage": 10, "start_date": "2025-01-01"},
            {"percentage": 50, "start_date": "2025-02-01"}
        ]}),
        json!({"strategy": "composite", "operator": "OR", "strategies": [
            {"type": "user_id", "whitelist": ["vip"]},
            {"type": "percentage", "percentage": 5}
        ]}),
    ];

    for shape in shapes {
        let result = service.validate(&config(shape.clone()));
        assert!(result.is_valid(), "{} -> {:?}", shape, result.errors());
    }
}

#[test]
fn test_errors_are_collected_in_one_pass() {
    let result = ValidationService::new().validate(&config(json!({
        "strategy": "percentage",
        "percentage": "lots",
        "hash_algorithm": "crc64",
        "stickiness": [],
        "hash_seed": 1
    })));
    assert_eq!(result.errors().len(), 4);
}

#[test]
fn test_six_levels_of_nesting() {
    let mut entry = json!({"type": "ip", "whitelist": ["not-an-ip"]});
    for _ in 0..5 {
        entry = json!({"type": "composite", "strategies": [entry]});
    }
    let flag = config(json!({"strategy": "composite", "strategies": [entry]}));

    let result = ValidationService::new().validate(&flag);
    assert_eq!(result.errors(), ["Maximum nesting depth of 5 exceeded"]);
    assert!(result.warnings().is_empty());
}

#[test]
fn test_validate_or_throw_carries_full_result() {
    let service = ValidationService::new();
    let flag = config(json!({
        "strategy": "composite",
        "strategies": [{"type": "percentage", "percentage": 101}]
    }));

    let err = service.validate_or_throw(&flag).unwrap_err();
    assert_eq!(err.strategy, "composite");
    assert_eq!(err.errors(), ["strategies[0]: percentage must be between 0 and 100"]);
    assert_eq!(err.warnings(), ["composite contains a single strategy"]);
    assert!(err.to_string().starts_with("Invalid composite configuration"));
    assert_eq!(err.to_json()["valid"], false);
}

#[test]
fn test_missing_strategy_through_throw() {
    let err = ValidationService::new()
        .validate_or_throw(&FlagConfig::new())
        .unwrap_err();
    assert_eq!(err.strategy, "unknown");
    assert_eq!(err.errors(), ["strategy is required"]);
}

#[test]
fn test_validate_all_reports_per_flag() {
    let mut flags = HashMap::new();
    flags.insert("a".to_string(), config(json!({"strategy": "simple"})));
    flags.insert("b".to_string(), config(json!({"strategy": "ip"})));
    flags.insert("c".to_string(), config(json!({"strategy": "percentage", "percentage": 0})));

    let results = ValidationService::new().validate_all(&flags);
    assert_eq!(results.len(), 3);
    assert!(results["a"].is_valid());
    assert!(!results["b"].is_valid());
    assert!(results["c"].is_valid());
    assert!(results["c"].has_warnings());
}

#[test]
fn test_configured_timezone_is_used_for_dates() {
    let service =
        ValidationService::with_config(ToggleConfig::new().with_default_timezone(Tz::Asia__Tokyo));
    assert_eq!(service.config().default_timezone, Tz::Asia__Tokyo);

    let result = service.validate(&config(json!({
        "strategy": "date_range",
        "start_date": "2999-01-01T00:00:00+09:00",
        "end_date": "2999-01-01"
    })));
    assert!(result.is_valid(), "{:?}", result.errors());
}

#[test]
fn test_segment_names_checked_against_repository() {
    let repository = InMemorySegmentRepository::new()
        .with_segment(StaticSegment::new("beta", ["u1", "u2"]));
    let service = ValidationService::builder()
        .segments(Arc::new(repository))
        .build();

    let result = service.validate(&config(json!({
        "strategy": "composite",
        "strategies": [
            {"type": "segment", "segments": ["beta", "alpha"]},
            {"type": "geo", "countries": ["Germany"]}
        ]
    })));
    assert!(result.is_valid());
    assert_eq!(
        result.warnings(),
        [
            "strategies[0]: segment 'alpha' is not defined",
            "strategies[1]: country 'Germany' is not a two-letter ISO 3166-1 code"
        ]
    );
}

#[test]
fn test_required_context_of_mixed_composite() {
    let service = ValidationService::new();
    let flag = config(json!({
        "strategy": "composite",
        "strategies": [
            {"type": "percentage", "percentage": 50},
            {"type": "geo", "countries": ["US"]},
            {"type": "ip", "whitelist": ["127.0.0.1"]}
        ]
    }));
    assert_eq!(
        service.required_context(&flag),
        ["country", "ip_address", "session_id", "user_id"]
    );
}

#[test]
fn test_result_serializes() {
    let result = ValidationService::new().validate(&config(json!({"strategy": "geo"})));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        json!({
            "errors": ["at least one of countries, regions or cities is required"],
            "warnings": []
        })
    );
}
