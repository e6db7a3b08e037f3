// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./routewise.toml` > `~/.config/routewise/routewise.toml` >
//! `/etc/routewise/routewise.toml` with environment variable overrides via `ROUTEWISE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RoutewiseConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/routewise/routewise.toml";

/// Local config file name, resolved against the working directory.
pub const LOCAL_CONFIG_FILE: &str = "routewise.toml";

/// Config sections recognised by the env provider, in matching order.
const SECTIONS: &[&str] = &[
    "router",
    "cache",
    "session",
    "escalation",
    "learning",
    "stats",
    "directive",
    "log",
];

/// Path of the per-user config file, if a config dir exists.
pub fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("routewise").join(LOCAL_CONFIG_FILE))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/routewise/routewise.toml` (system-wide)
/// 3. `~/.config/routewise/routewise.toml` (user XDG config)
/// 4. `./routewise.toml` (local directory)
/// 5. `ROUTEWISE_*` environment variables
pub fn load_config() -> Result<RoutewiseConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<RoutewiseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RoutewiseConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RoutewiseConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section-to-dot mapping.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `ROUTEWISE_ROUTER_CONFIDENCE_THRESHOLD` maps to `router.confidence_threshold`
/// rather than `router.confidence.threshold`.
fn env_provider() -> Env {
    Env::prefixed("ROUTEWISE_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
