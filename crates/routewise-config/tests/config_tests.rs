// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Routewise configuration system.

use routewise_config::diagnostic::{ConfigError, suggest_key};
use routewise_config::model::RoutewiseConfig;
use routewise_config::{load_and_validate_str, load_config, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[router]
confidence_threshold = 0.65
min_query_chars = 12
command_marker = "!"

[cache]
enabled = true
path = "/tmp/routewise/cache.json"
memory_capacity = 50
max_entries = 200

[session]
path = "/tmp/routewise/session.json"
inactivity_minutes = 15

[escalation]
enabled = false
model = "claude-haiku-4-5-20251001"
timeout_secs = 5

[learning]
informed_routing = true
boost = 0.15
knowledge_dir = "/tmp/routewise/knowledge"

[stats]
enabled = false

[directive]
agent_namespace = "router:"

[log]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.router.confidence_threshold, 0.65);
    assert_eq!(config.router.min_query_chars, 12);
    assert_eq!(config.router.command_marker, "!");
    assert_eq!(config.cache.memory_capacity, 50);
    assert_eq!(config.cache.max_entries, 200);
    assert_eq!(
        config.cache.path,
        std::path::PathBuf::from("/tmp/routewise/cache.json")
    );
    assert_eq!(config.session.inactivity_minutes, 15);
    assert!(!config.escalation.enabled);
    assert_eq!(config.escalation.timeout_secs, 5);
    assert!(config.learning.informed_routing);
    assert_eq!(config.learning.boost, 0.15);
    assert!(!config.stats.enabled);
    assert_eq!(config.directive.agent_namespace, "router:");
    assert_eq!(config.log.level, "debug");
}

/// Sections left out of the file fall back to compiled defaults.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("[router]\nmin_query_chars = 20\n").unwrap();
    assert_eq!(config.router.min_query_chars, 20);
    assert_eq!(config.router.confidence_threshold, 0.7);
    assert_eq!(config.cache.max_entries, 500);
    assert!(config.escalation.enabled);
}

/// Unknown field in [cache] is rejected.
#[test]
fn unknown_field_in_cache_produces_error() {
    let err = load_config_from_str("[cache]\nmax_entires = 10\n")
        .expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("max_entires"),
        "error should mention the bad key, got: {err_str}"
    );
}

/// Unknown top-level section is rejected.
#[test]
fn deny_unknown_fields_at_top_level() {
    let result = load_config_from_str("[telemetry]\nenabled = true\n");
    assert!(result.is_err(), "unknown section should be rejected");
}

/// Unknown key diagnostics carry a suggestion and the list of valid keys.
#[test]
fn diagnostic_error_suggests_correction() {
    let errors = load_and_validate_str("[router]\nconfidence_treshold = 0.5\n")
        .expect_err("should produce errors");

    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "confidence_treshold"
                && suggestion.as_deref() == Some("confidence_threshold")
                && valid_keys.contains("min_query_chars")
        })
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

/// A string where a number is expected is reported as an invalid type.
#[test]
fn diagnostic_invalid_type_message() {
    let errors = load_and_validate_str("[cache]\nmax_entries = \"lots\"\n")
        .expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_rejects_out_of_range_threshold() {
    let errors = load_and_validate_str("[router]\nconfidence_threshold = 3.0\n")
        .expect_err("threshold above 1.0 should fail");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn load_and_validate_defaults() {
    let config = load_and_validate_str("").expect("empty config is valid");
    assert_eq!(config.router.command_marker, "/");
}

#[test]
fn suggest_key_is_exported() {
    assert_eq!(
        suggest_key("inactivty_minutes", &["enabled", "path", "inactivity_minutes"]),
        Some("inactivity_minutes".to_string())
    );
}

/// ROUTEWISE_* variables override file values, one underscore per section.
#[test]
fn env_vars_override_local_file() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "routewise.toml",
            "[router]\nconfidence_threshold = 0.6\n[cache]\nmax_entries = 42\n",
        )?;
        jail.set_env("ROUTEWISE_ROUTER_CONFIDENCE_THRESHOLD", "0.8");
        jail.set_env("ROUTEWISE_LEARNING_INFORMED_ROUTING", "true");

        let config: RoutewiseConfig = load_config()?;
        assert_eq!(config.router.confidence_threshold, 0.8);
        assert_eq!(config.cache.max_entries, 42);
        assert!(config.learning.informed_routing);
        Ok(())
    });
}

#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "max_entires".to_string(),
        suggestion: Some("max_entries".to_string()),
        valid_keys: "enabled, path, memory_capacity, max_entries".to_string(),
        span: None,
        src: None,
    };

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("max_entires"));
}
