// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing statistics ledger.
//!
//! A single JSON document accumulates per-route counters, exception
//! counters and savings estimates, plus one summary per calendar day for
//! the last [`MAX_DAILY_SESSIONS`] days. Each decision is recorded with a
//! single locked read-modify-write, so concurrent invocations never lose
//! counts. Documents written by older versions load with missing counters
//! set to zero.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, Utc};
use routewise_config::model::StatsConfig;
use routewise_core::{ClassificationResult, ExceptionKind, Method, Route, RoutewiseError};
use routewise_storage::JsonDocument;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pricing::{delegation_savings, estimated_savings};

/// Schema version written by this ledger.
pub const STATS_VERSION: &str = "1.2";

/// Number of daily summaries retained.
pub const MAX_DAILY_SESSIONS: usize = 30;

/// Decisions per route; deep orchestrated work is counted separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteCounts {
    pub fast: u64,
    pub standard: u64,
    pub deep: u64,
    pub orchestrated: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExceptionCounts {
    pub router_meta: u64,
    pub slash_commands: u64,
}

impl ExceptionCounts {
    fn bump(&mut self, kind: ExceptionKind) {
        match kind {
            ExceptionKind::RouterMeta => self.router_meta += 1,
            ExceptionKind::SlashCommands => self.slash_commands += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyRoutes {
    pub fast: u64,
    pub standard: u64,
    pub deep: u64,
}

impl DailyRoutes {
    fn bump(&mut self, route: Route) {
        match route {
            Route::Fast => self.fast += 1,
            Route::Standard => self.standard += 1,
            Route::Deep => self.deep += 1,
        }
    }
}

/// Summary of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySession {
    pub date: NaiveDate,
    #[serde(default)]
    pub queries: u64,
    #[serde(default)]
    pub routes: DailyRoutes,
    #[serde(default)]
    pub savings: f64,
}

/// The persisted statistics document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterStats {
    pub version: String,
    pub total_queries: u64,
    pub routes: RouteCounts,
    pub exceptions: ExceptionCounts,
    pub tool_intensive_queries: u64,
    pub orchestrated_queries: u64,
    pub cache_hits: u64,
    pub escalations: u64,
    pub estimated_savings: f64,
    pub delegation_savings: f64,
    /// Most recent day first.
    pub sessions: Vec<DailySession>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for RouterStats {
    fn default() -> Self {
        Self {
            version: STATS_VERSION.to_string(),
            total_queries: 0,
            routes: RouteCounts::default(),
            exceptions: ExceptionCounts::default(),
            tool_intensive_queries: 0,
            orchestrated_queries: 0,
            cache_hits: 0,
            escalations: 0,
            estimated_savings: 0.0,
            delegation_savings: 0.0,
            sessions: Vec::new(),
            last_updated: None,
        }
    }
}

impl RouterStats {
    /// Account for one routed decision made on `today`.
    pub fn record_decision(&mut self, result: &ClassificationResult, today: NaiveDate) {
        let meta = &result.metadata;
        self.version = STATS_VERSION.to_string();
        self.total_queries += 1;

        if let Some(kind) = meta.exception_type {
            self.exceptions.bump(kind);
        }

        if meta.orchestration && result.route == Route::Deep {
            self.routes.orchestrated += 1;
            self.orchestrated_queries += 1;
        } else {
            match result.route {
                Route::Fast => self.routes.fast += 1,
                Route::Standard => self.routes.standard += 1,
                Route::Deep => self.routes.deep += 1,
            }
        }

        if meta.tool_intensive {
            self.tool_intensive_queries += 1;
        }
        match result.method {
            Method::Cache => self.cache_hits += 1,
            Method::Escalation => self.escalations += 1,
            Method::Rules => {}
        }

        let savings = estimated_savings(result.route);
        self.estimated_savings += savings;
        if meta.orchestration {
            self.delegation_savings += delegation_savings();
        }

        let day = self.day_mut(today);
        day.queries += 1;
        day.routes.bump(result.route);
        day.savings += savings;

        self.sessions.sort_by(|a, b| b.date.cmp(&a.date));
        self.sessions.truncate(MAX_DAILY_SESSIONS);
        self.last_updated = Some(Utc::now());
    }

    /// Count a query that was tracked but not routed.
    pub fn record_exception(&mut self, kind: ExceptionKind) {
        self.version = STATS_VERSION.to_string();
        self.exceptions.bump(kind);
        self.last_updated = Some(Utc::now());
    }

    fn day_mut(&mut self, date: NaiveDate) -> &mut DailySession {
        let idx = match self.sessions.iter().position(|s| s.date == date) {
            Some(idx) => idx,
            None => {
                self.sessions.push(DailySession {
                    date,
                    queries: 0,
                    routes: DailyRoutes::default(),
                    savings: 0.0,
                });
                self.sessions.len() - 1
            }
        };
        &mut self.sessions[idx]
    }
}

/// File-backed [`RouterStats`].
#[derive(Debug, Clone)]
pub struct StatsLedger {
    doc: JsonDocument<RouterStats>,
}

impl StatsLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            doc: JsonDocument::new(path),
        }
    }

    pub fn from_config(config: &StatsConfig) -> Self {
        Self::new(&config.path)
    }

    pub fn path(&self) -> &Path {
        self.doc.path()
    }

    pub fn record(&self, result: &ClassificationResult) -> Result<(), RoutewiseError> {
        self.record_at(result, Local::now().date_naive())
    }

    pub fn record_at(&self, result: &ClassificationResult, today: NaiveDate) -> Result<(), RoutewiseError> {
        self.doc.update(|stats| stats.record_decision(result, today))?;
        debug!(route = %result.route, method = %result.method, "stats recorded");
        Ok(())
    }

    pub fn record_exception(&self, kind: ExceptionKind) -> Result<(), RoutewiseError> {
        self.doc.update(|stats| stats.record_exception(kind))
    }

    pub fn load(&self) -> Result<RouterStats, RoutewiseError> {
        self.doc.load()
    }
}
