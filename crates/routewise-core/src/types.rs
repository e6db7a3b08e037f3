// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Routewise workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Maximum length, in characters, of a single signal snippet.
pub const MAX_SIGNAL_CHARS: usize = 80;

/// Cost/capability tier a query is routed to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Cheapest tier: lookups, formatting, simple questions.
    Fast,
    /// Middle tier: bug fixes, features, tool-heavy but shallow work.
    Standard,
    /// Most capable tier: architecture, security, trade-off analysis.
    Deep,
}

impl Route {
    /// All routes, cheapest first.
    pub const ALL: [Route; 3] = [Route::Fast, Route::Standard, Route::Deep];
}

/// How a classification result was produced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Rules,
    Cache,
    Escalation,
}

/// Known exception categories: queries that are classified but tracked separately.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    /// Questions about the router itself.
    RouterMeta,
    /// Host slash commands (never classified, only counted).
    SlashCommands,
}

/// Annotations attached to a classification result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tool_intensive: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub orchestration: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub follow_up: bool,
    /// Reason the session tracker raised confidence, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_boost: Option<String>,
    /// Description of the learned adjustment applied, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learned_boost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_type: Option<ExceptionKind>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cache_hit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// Outcome of classifying one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub route: Route,
    /// Confidence in `[0, 1]`. Only used to gate escalation.
    pub confidence: f64,
    /// Matched text snippets, each at most [`MAX_SIGNAL_CHARS`] characters.
    pub signals: Vec<String>,
    pub method: Method,
    #[serde(default)]
    pub metadata: ResultMetadata,
}

impl ClassificationResult {
    /// Creates a result, clamping confidence and truncating signal snippets.
    pub fn new(route: Route, confidence: f64, signals: Vec<String>, method: Method) -> Self {
        Self {
            route,
            confidence: clamp_confidence(confidence),
            signals: signals.into_iter().map(|s| truncate_chars(&s, MAX_SIGNAL_CHARS)).collect(),
            method,
            metadata: ResultMetadata::default(),
        }
    }

    /// Replaces the metadata, builder style.
    pub fn with_metadata(mut self, metadata: ResultMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sets confidence, keeping it inside `[0, 1]`.
    pub fn set_confidence(&mut self, confidence: f64) {
        self.confidence = clamp_confidence(confidence);
    }
}

/// Clamps to `[0, 1]`; NaN becomes 0.
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Truncates a string to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
