//! Tests for the full validation pipeline.

use super::*;
use crate::schema::*;

#[test]
fn default_config_validates() {
    let config = ScenecastConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_tick_interval_zero() {
    let mut config = ScenecastConfig::default();
    config.presence.tick_interval_ms = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("presence.tick_interval_ms"));
}

#[test]
fn catches_tick_interval_too_large() {
    let mut config = ScenecastConfig::default();
    config.presence.tick_interval_ms = 5000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("presence.tick_interval_ms"));
}

#[test]
fn catches_inverted_time_range() {
    let mut config = ScenecastConfig::default();
    config.contexts.insert(
        "Match".into(),
        ContextPresence {
            start: Some(200),
            end: Some(100),
            ..Default::default()
        },
    );
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("contexts.Match"));
}

#[test]
fn zero_and_equal_timestamps_are_fine() {
    let mut config = ScenecastConfig::default();
    config.contexts.insert(
        "Match".into(),
        ContextPresence {
            start: Some(0),
            end: Some(0),
            ..Default::default()
        },
    );
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_blank_context_name() {
    let mut config = ScenecastConfig::default();
    config.contexts.insert("  ".into(), ContextPresence::default());
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("must not be blank"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = ScenecastConfig::default();
    config.presence.tick_interval_ms = 0;
    config.contexts.insert(
        "Match".into(),
        ContextPresence {
            start: Some(10),
            end: Some(5),
            ..Default::default()
        },
    );
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("presence.tick_interval_ms"));
    assert!(err.contains("contexts.Match"));
    assert!(err.contains("; "));
}
