// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation continuity across invocations.
//!
//! Each invocation is a fresh process, so the previous decision lives in a
//! small session document. A short follow-up ("and also the tests") to a
//! standard or deep exchange should not be confidently sent to the cheapest
//! tier on its own merits; the tracker raises its confidence a little and
//! marks it so the orchestrator lets the oracle take a second look.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use routewise_config::model::SessionConfig;
use routewise_core::{ClassificationResult, ResultMetadata, Route, RoutewiseError};
use routewise_storage::JsonDocument;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Boosted confidence never exceeds this.
pub const BOOST_CAP: f64 = 0.75;

/// Amount added to a follow-up's confidence.
pub const BOOST_STEP: f64 = 0.1;

/// Follow-ups at or above this confidence are left alone.
pub const BOOST_CEILING: f64 = 0.8;

/// Openers that continue the previous request.
const FOLLOW_UP_PREFIXES: &[&str] = &[
    "and ",
    "also ",
    "but ",
    "what about",
    "how about",
    "go on",
    "keep going",
];

/// Single-word acknowledgements and redirections; matched as whole words.
const FOLLOW_UP_WORDS: &[&str] = &[
    "yes", "yeah", "yep", "ok", "okay", "sure", "right", "continue", "proceed", "actually",
    "wait", "instead",
];

/// Persisted continuity state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub last_route: Option<Route>,
    #[serde(default)]
    pub last_query_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub conversation_depth: u32,
    #[serde(default)]
    pub last_metadata: ResultMetadata,
}

impl SessionState {
    /// True when there is no previous query or it is older than `inactivity`.
    pub fn is_stale(&self, now: DateTime<Utc>, inactivity: Duration) -> bool {
        match self.last_query_time {
            Some(at) => now.signed_duration_since(at) > inactivity,
            None => true,
        }
    }
}

/// Does `text` read as a continuation of the previous request?
pub fn is_follow_up(text: &str) -> bool {
    let lower = text.trim_start().to_lowercase();
    if FOLLOW_UP_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return true;
    }
    let first_word = lower
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default();
    FOLLOW_UP_WORDS.contains(&first_word)
}

/// Raise a low-confidence fast follow-up to a standard or deep exchange.
///
/// The route never changes. Confidence becomes
/// `max(c, min(c + BOOST_STEP, BOOST_CAP))`.
pub fn boost(query: &str, mut result: ClassificationResult, session: &SessionState) -> ClassificationResult {
    let Some(previous) = session.last_route else {
        return result;
    };
    if !is_follow_up(query) {
        return result;
    }
    result.metadata.follow_up = true;

    if matches!(previous, Route::Standard | Route::Deep)
        && result.route == Route::Fast
        && result.confidence < BOOST_CEILING
    {
        let c = result.confidence;
        result.set_confidence(c.max((c + BOOST_STEP).min(BOOST_CAP)));
        result.metadata.context_boost = Some(format!("follow-up to {previous}"));
        debug!(previous = %previous, from = c, to = result.confidence, "context boost applied");
    }
    result
}

/// Reads and writes the session document.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    doc: JsonDocument<SessionState>,
    inactivity: Duration,
}

impl SessionTracker {
    pub fn new(path: impl Into<PathBuf>, inactivity_minutes: u64) -> Self {
        let inactivity = i64::try_from(inactivity_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .unwrap_or(Duration::MAX);
        Self {
            doc: JsonDocument::new(path),
            inactivity,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.path, config.inactivity_minutes)
    }

    /// Current state; stale or unreadable state reads as empty.
    pub fn current(&self) -> SessionState {
        self.current_at(Utc::now())
    }

    pub fn current_at(&self, now: DateTime<Utc>) -> SessionState {
        let state = self.doc.load_or_default();
        if state.is_stale(now, self.inactivity) {
            SessionState::default()
        } else {
            state
        }
    }

    /// Record a decision as the latest exchange.
    pub fn record(&self, result: &ClassificationResult) -> Result<(), RoutewiseError> {
        self.record_at(result, Utc::now())
    }

    pub fn record_at(&self, result: &ClassificationResult, now: DateTime<Utc>) -> Result<(), RoutewiseError> {
        let inactivity = self.inactivity;
        self.doc.update(|state| {
            let fresh = state.is_stale(now, inactivity);
            state.conversation_depth = if fresh {
                1
            } else {
                state.conversation_depth.saturating_add(1)
            };
            state.last_route = Some(result.route);
            state.last_query_time = Some(now);
            state.last_metadata = result.metadata.clone();
        })
    }
}
