// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached decision records.

use chrono::NaiveDate;
use routewise_core::types::truncate_chars;
use routewise_core::{ClassificationResult, Method, ResultMetadata, Route};
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;

/// Maximum characters of the original query kept for inspection.
pub const QUERY_PREVIEW_CHARS: usize = 80;

/// One remembered classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub route: Route,
    pub confidence: f64,
    #[serde(default)]
    pub signals: Vec<String>,
    /// Calendar date of the last write or persistent hit.
    pub last_used: NaiveDate,
    /// Number of times this fingerprint was written or served; at least 1.
    pub hit_count: u32,
    #[serde(default)]
    pub query_preview: String,
    #[serde(default)]
    pub tool_intensive: bool,
    #[serde(default)]
    pub orchestration: bool,
}

impl CacheEntry {
    /// Build a fresh entry (hit count 1) from a pipeline result.
    pub fn from_result(
        fingerprint: Fingerprint,
        query: &str,
        result: &ClassificationResult,
        today: NaiveDate,
    ) -> Self {
        Self {
            fingerprint,
            route: result.route,
            confidence: result.confidence,
            signals: result.signals.clone(),
            last_used: today,
            hit_count: 1,
            query_preview: truncate_chars(query.trim(), QUERY_PREVIEW_CHARS),
            tool_intensive: result.metadata.tool_intensive,
            orchestration: result.metadata.orchestration,
        }
    }

    /// Convert back into a result served from the cache.
    pub fn to_result(&self) -> ClassificationResult {
        ClassificationResult::new(
            self.route,
            self.confidence,
            self.signals.clone(),
            Method::Cache,
        )
        .with_metadata(ResultMetadata {
            tool_intensive: self.tool_intensive,
            orchestration: self.orchestration,
            cache_hit: true,
            fingerprint: Some(self.fingerprint.to_string()),
            ..ResultMetadata::default()
        })
    }

    /// Refresh this entry with a newer decision for the same fingerprint.
    pub(crate) fn refresh_from(&mut self, newer: &CacheEntry) {
        self.route = newer.route;
        self.confidence = newer.confidence;
        self.signals = newer.signals.clone();
        self.tool_intensive = newer.tool_intensive;
        self.orchestration = newer.orchestration;
        self.last_used = newer.last_used;
        self.hit_count = self.hit_count.saturating_add(1);
    }
}
