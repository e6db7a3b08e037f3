// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Routewise.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Routewise configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutewiseConfig {
    /// Classification thresholds and input gating.
    #[serde(default)]
    pub router: RouterConfig,

    /// Decision cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Conversation continuity settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// External oracle settings.
    #[serde(default)]
    pub escalation: EscalationConfig,

    /// Knowledge-derived adjustment settings.
    #[serde(default)]
    pub learning: LearningConfig,

    /// Routing statistics settings.
    #[serde(default)]
    pub stats: StatsConfig,

    /// Host directive rendering.
    #[serde(default)]
    pub directive: DirectiveConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Classification thresholds and input gating.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Results below this confidence are escalated to the oracle.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Queries shorter than this many characters are skipped.
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    /// Queries starting with this marker are host commands and are skipped.
    #[serde(default = "default_command_marker")]
    pub command_marker: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            min_query_chars: default_min_query_chars(),
            command_marker: default_command_marker(),
        }
    }
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_min_query_chars() -> usize {
    10
}

fn default_command_marker() -> String {
    "/".to_string()
}

/// Decision cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Enable the decision cache (both tiers).
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path to the persistent cache document.
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    /// Maximum entries held in the in-process memory tier.
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,

    /// Maximum entries kept in the persistent tier.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_cache_path(),
            memory_capacity: default_memory_capacity(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    data_dir().join("cache.json")
}

fn default_memory_capacity() -> usize {
    100
}

fn default_max_entries() -> usize {
    500
}

/// Conversation continuity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Enable follow-up detection and the session file.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path to the session state document.
    #[serde(default = "default_session_path")]
    pub path: PathBuf,

    /// Minutes of inactivity after which a session is treated as fresh.
    #[serde(default = "default_inactivity_minutes")]
    pub inactivity_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_session_path(),
            inactivity_minutes: default_inactivity_minutes(),
        }
    }
}

fn default_session_path() -> PathBuf {
    data_dir().join("session.json")
}

fn default_inactivity_minutes() -> u64 {
    30
}

/// External escalation oracle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EscalationConfig {
    /// Enable escalation of low-confidence results.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Model used for escalation classification.
    #[serde(default = "default_escalation_model")]
    pub model: String,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Maximum tokens the oracle may generate.
    #[serde(default = "default_escalation_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on the single escalation attempt, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Messages API endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_escalation_model(),
            api_version: default_api_version(),
            max_tokens: default_escalation_max_tokens(),
            timeout_secs: default_timeout_secs(),
            base_url: default_base_url(),
        }
    }
}

fn default_escalation_model() -> String {
    "claude-haiku-4-5-20251001".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_escalation_max_tokens() -> u32 {
    150
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_base_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

/// Knowledge-derived adjustment configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LearningConfig {
    /// Opt-in flag. When false the learned adjustment step is a no-op.
    #[serde(default)]
    pub informed_routing: bool,

    /// Confidence added on a learned promotion.
    #[serde(default = "default_learning_boost")]
    pub boost: f64,

    /// Directory of Markdown knowledge files.
    #[serde(default = "default_knowledge_dir")]
    pub knowledge_dir: PathBuf,

    /// Path to the extracted keyword state shared between processes.
    #[serde(default = "default_learning_state_path")]
    pub state_path: PathBuf,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            informed_routing: false,
            boost: default_learning_boost(),
            knowledge_dir: default_knowledge_dir(),
            state_path: default_learning_state_path(),
        }
    }
}

fn default_learning_boost() -> f64 {
    0.1
}

fn default_knowledge_dir() -> PathBuf {
    data_dir().join("knowledge")
}

fn default_learning_state_path() -> PathBuf {
    data_dir().join("learning-state.json")
}

/// Routing statistics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StatsConfig {
    /// Record every decision in the stats ledger.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path to the stats document.
    #[serde(default = "default_stats_path")]
    pub path: PathBuf,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_stats_path(),
        }
    }
}

fn default_stats_path() -> PathBuf {
    data_dir().join("router-stats.json")
}

/// Host directive rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DirectiveConfig {
    /// Prefix prepended to execution agent names (e.g. `routewise:fast-executor`).
    #[serde(default = "default_agent_namespace")]
    pub agent_namespace: String,
}

impl Default for DirectiveConfig {
    fn default() -> Self {
        Self {
            agent_namespace: default_agent_namespace(),
        }
    }
}

fn default_agent_namespace() -> String {
    "routewise:".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

/// Base directory for all Routewise state files.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("routewise")
}
