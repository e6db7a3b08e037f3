// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as threshold ranges, non-zero capacities, and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::RoutewiseConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RoutewiseConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let threshold = config.router.confidence_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        errors.push(ConfigError::Validation {
            message: format!("router.confidence_threshold must be within 0.0..=1.0, got {threshold}"),
        });
    }

    if config.router.command_marker.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "router.command_marker must not be empty".to_string(),
        });
    }

    if config.cache.memory_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "cache.memory_capacity must be at least 1".to_string(),
        });
    }

    if config.cache.max_entries == 0 {
        errors.push(ConfigError::Validation {
            message: "cache.max_entries must be at least 1".to_string(),
        });
    }

    if config.cache.path.as_os_str().is_empty() {
        errors.push(ConfigError::Validation {
            message: "cache.path must not be empty".to_string(),
        });
    }

    if config.session.path.as_os_str().is_empty() {
        errors.push(ConfigError::Validation {
            message: "session.path must not be empty".to_string(),
        });
    }

    if config.stats.path.as_os_str().is_empty() {
        errors.push(ConfigError::Validation {
            message: "stats.path must not be empty".to_string(),
        });
    }

    if config.escalation.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "escalation.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.escalation.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "escalation.model must not be empty".to_string(),
        });
    }

    let boost = config.learning.boost;
    if !(0.0..=1.0).contains(&boost) {
        errors.push(ConfigError::Validation {
            message: format!("learning.boost must be within 0.0..=1.0, got {boost}"),
        });
    }

    let level = config.log.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
