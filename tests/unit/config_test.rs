//! Tests for configuration parsing and validation

use prometheus_pending::config::{LimitConfig, ManagerConfig};
use prometheus_pending::core::{SchedulerError, Strategy};

#[test]
fn test_default_config_is_unlimited() {
    let cfg = ManagerConfig::default();
    assert!(cfg.limit.is_none());
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_limit_config_validation() {
    let valid = LimitConfig {
        max_concurrent: 4,
        strategy: Strategy::Drop,
    };
    assert!(valid.validate().is_ok());

    let invalid = LimitConfig {
        max_concurrent: 0,
        strategy: Strategy::Block,
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_from_json_with_limit() {
    let cfg = ManagerConfig::from_json_str(
        r#"{ "limit": { "max_concurrent": 8, "strategy": "drop" } }"#,
    )
    .unwrap();
    let limit = cfg.limit.unwrap();
    assert_eq!(limit.max_concurrent, 8);
    assert_eq!(limit.strategy, Strategy::Drop);
}

#[test]
fn test_from_json_strategy_defaults_to_block() {
    let cfg = ManagerConfig::from_json_str(r#"{ "limit": { "max_concurrent": 2 } }"#).unwrap();
    assert_eq!(cfg.limit.unwrap().strategy, Strategy::Block);
}

#[test]
fn test_from_json_empty_object() {
    let cfg = ManagerConfig::from_json_str("{}").unwrap();
    assert!(cfg.limit.is_none());
}

#[test]
fn test_from_json_rejects_zero_limit() {
    let result = ManagerConfig::from_json_str(r#"{ "limit": { "max_concurrent": 0 } }"#);
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_from_json_rejects_malformed_input() {
    let result = ManagerConfig::from_json_str("{ not json");
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_config_serialization_roundtrip() {
    let cfg = ManagerConfig {
        limit: Some(LimitConfig {
            max_concurrent: 3,
            strategy: Strategy::Drop,
        }),
    };
    let json = serde_json::to_string(&cfg).unwrap();
    assert!(json.contains("\"drop\""));
    let parsed = ManagerConfig::from_json_str(&json).unwrap();
    assert_eq!(parsed, cfg);
}
