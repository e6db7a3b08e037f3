// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decision pipeline.
//!
//! Sequences the routing stages for one query:
//! input gate > cache check > (hit: session update) or
//! (miss: rules > context boost > escalate or skip > learned adjust >
//! cache write > session update) > stats update.
//!
//! Every stage after the gate is best-effort. A failing stage is handled by
//! [`RoutewiseError::recovery`]: unreadable state reads as defaults, a failed
//! escalation or write is skipped, and only invalid input ends the query
//! without a decision. The cache store applies the same policy internally
//! and always degrades to a miss.
//!
//! Store access is synchronous and may wait briefly on an advisory lock
//! while holding the runtime thread. Each invocation owns its router, so
//! nothing else is scheduled behind it.

use std::sync::Arc;
use std::time::Duration;

use routewise_cache::{CacheStore, Fingerprint, Tier, fingerprint};
use routewise_config::RoutewiseConfig;
use routewise_core::{
    ClassificationResult, EscalationOracle, ExceptionKind, Recovery, Route, RoutewiseError,
};
use routewise_cost::StatsLedger;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classifier::RuleClassifier;
use crate::context::{SessionTracker, boost};
use crate::learning::LearningEngine;

/// Gate and escalation settings.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    /// Results below this confidence are escalated.
    pub confidence_threshold: f64,
    /// Shorter queries (in characters, after trimming) are rejected.
    pub min_query_chars: usize,
    /// Queries starting with this marker are host commands.
    pub command_marker: String,
    /// Upper bound on one oracle call.
    pub escalation_timeout: Duration,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            min_query_chars: 10,
            command_marker: "/".to_string(),
            escalation_timeout: Duration::from_secs(10),
        }
    }
}

impl RouterSettings {
    pub fn from_config(config: &RoutewiseConfig) -> Self {
        Self {
            confidence_threshold: config.router.confidence_threshold,
            min_query_chars: config.router.min_query_chars,
            command_marker: config.router.command_marker.clone(),
            escalation_timeout: Duration::from_secs(config.escalation.timeout_secs),
        }
    }
}

/// The outcome of routing one query.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    #[serde(flatten)]
    pub result: ClassificationResult,
    #[serde(skip)]
    pub fingerprint: Fingerprint,
    /// Tier that served the decision, when it came from the cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_tier: Option<Tier>,
}

/// Routes queries through the full pipeline.
///
/// Owns the in-process state (memory cache tier, learned keywords) so a
/// single instance should serve every query of a process.
pub struct DecisionRouter {
    settings: RouterSettings,
    classifier: RuleClassifier,
    cache: Option<CacheStore>,
    session: Option<SessionTracker>,
    learning: Option<LearningEngine>,
    oracle: Option<Arc<dyn EscalationOracle>>,
    stats: Option<StatsLedger>,
}

impl DecisionRouter {
    /// A rules-only router with no cache, session, learning, oracle or stats.
    pub fn new(settings: RouterSettings) -> Result<Self, RoutewiseError> {
        Ok(Self {
            settings,
            classifier: RuleClassifier::new()?,
            cache: None,
            session: None,
            learning: None,
            oracle: None,
            stats: None,
        })
    }

    /// Build a router with every stage the configuration enables.
    pub fn from_config(
        config: &RoutewiseConfig,
        oracle: Option<Arc<dyn EscalationOracle>>,
    ) -> Result<Self, RoutewiseError> {
        let mut router = Self::new(RouterSettings::from_config(config))?;
        if config.cache.enabled {
            router = router.with_cache(CacheStore::from_config(&config.cache));
        }
        if config.session.enabled {
            router = router.with_session(SessionTracker::from_config(&config.session));
        }
        if config.learning.informed_routing {
            router = router.with_learning(LearningEngine::from_config(&config.learning));
        }
        if config.stats.enabled {
            router = router.with_stats(StatsLedger::from_config(&config.stats));
        }
        if let Some(oracle) = oracle.filter(|_| config.escalation.enabled) {
            router = router.with_oracle(oracle);
        }
        Ok(router)
    }

    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_session(mut self, session: SessionTracker) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_learning(mut self, learning: LearningEngine) -> Self {
        self.learning = Some(learning);
        self
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn EscalationOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn with_stats(mut self, stats: StatsLedger) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    pub fn cache(&self) -> Option<&CacheStore> {
        self.cache.as_ref()
    }

    /// Route `query`. Returns `None` when the query is rejected as invalid,
    /// by the gate or by the oracle.
    pub async fn route(&mut self, query: &str) -> Option<Decision> {
        if let Err(err) = self.gate(query) {
            if recover("gate", &err) == Recovery::SkipDecision {
                return None;
            }
        }
        let exception = self.classifier.detect_exception(query);
        let fp = fingerprint(query);

        if let Some((entry, tier)) = self.cache.as_mut().and_then(|c| c.lookup(&fp)) {
            let mut result = entry.to_result();
            result.metadata.exception_type = exception;
            debug!(fingerprint = %fp, tier = %tier, route = %result.route, "cache hit");
            self.finish(&result);
            return Some(Decision {
                result,
                fingerprint: fp,
                cache_tier: Some(tier),
            });
        }

        let mut result = self.classifier.classify(query);
        debug!(route = %result.route, confidence = result.confidence, "rule classification");

        if let Some(session) = &self.session {
            result = boost(query, result, &session.current());
        }

        if result.confidence < self.settings.confidence_threshold
            || result.metadata.context_boost.is_some()
        {
            result = self.escalate(query, result).await?;
        }

        if let Some(learning) = self.learning.as_mut() {
            match learning.adjust(query, &result) {
                Ok(adjusted) => result = adjusted,
                Err(err) => {
                    if recover("learned adjustment", &err) == Recovery::SkipDecision {
                        return None;
                    }
                }
            }
        }
        result.metadata.exception_type = exception;
        result.metadata.fingerprint = Some(fp.to_string());

        if let Some(cache) = self.cache.as_mut() {
            cache.upsert(fp.clone(), query, &result);
        }
        self.finish(&result);

        Some(Decision {
            result,
            fingerprint: fp,
            cache_tier: None,
        })
    }

    fn gate(&self, query: &str) -> Result<(), RoutewiseError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(RoutewiseError::InvalidInput("empty query".into()));
        }
        let marker = self.settings.command_marker.as_str();
        if !marker.is_empty() && trimmed.starts_with(marker) {
            if let Some(stats) = &self.stats {
                if let Err(err) = stats.record_exception(ExceptionKind::SlashCommands) {
                    recover("stats", &err);
                }
            }
            return Err(RoutewiseError::InvalidInput("host command".into()));
        }
        let chars = trimmed.chars().count();
        if chars < self.settings.min_query_chars {
            return Err(RoutewiseError::InvalidInput(format!(
                "query too short ({chars} < {} chars)",
                self.settings.min_query_chars
            )));
        }
        Ok(())
    }

    /// Ask the oracle for a second opinion. A failure keeps `rules` unless
    /// its recovery policy drops the decision.
    async fn escalate(
        &self,
        query: &str,
        rules: ClassificationResult,
    ) -> Option<ClassificationResult> {
        let Some(oracle) = &self.oracle else {
            return Some(rules);
        };
        let timeout = self.settings.escalation_timeout;
        let outcome = match tokio::time::timeout(timeout, oracle.classify(query)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RoutewiseError::Timeout { duration: timeout }),
        };

        match outcome {
            Ok(mut escalated) => {
                info!(
                    oracle = oracle.name(),
                    from = %rules.route,
                    to = %escalated.route,
                    confidence = escalated.confidence,
                    "escalation answered"
                );
                let flags = &rules.metadata;
                escalated.metadata.tool_intensive |= flags.tool_intensive;
                escalated.metadata.orchestration |=
                    flags.orchestration && escalated.route == Route::Deep;
                escalated.metadata.follow_up = flags.follow_up;
                escalated.metadata.context_boost = flags.context_boost.clone();
                Some(escalated)
            }
            Err(err) => match recover("escalation", &err) {
                Recovery::SkipDecision => None,
                Recovery::UseDefault | Recovery::SkipStep => {
                    debug!(oracle = oracle.name(), "keeping rule result");
                    Some(rules)
                }
            },
        }
    }

    fn finish(&self, result: &ClassificationResult) {
        if let Some(session) = &self.session {
            if let Err(err) = session.record(result) {
                recover("session", &err);
            }
        }
        if let Some(stats) = &self.stats {
            if let Err(err) = stats.record(result) {
                recover("stats", &err);
            }
        }
    }
}

/// Log a failed stage and return the policy for it.
fn recover(stage: &'static str, err: &RoutewiseError) -> Recovery {
    let recovery = err.recovery();
    match recovery {
        Recovery::UseDefault => warn!(stage, error = %err, "stage state unavailable, using defaults"),
        Recovery::SkipStep => warn!(stage, error = %err, "stage failed, skipping it"),
        Recovery::SkipDecision => debug!(stage, error = %err, "query skipped"),
    }
    recovery
}

#[cfg(test)]
mod tests {
    use super::*;
    use routewise_core::Method;

    fn rules_only() -> DecisionRouter {
        DecisionRouter::new(RouterSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn gate_rejects_short_empty_and_commands() {
        let mut router = rules_only();
        assert!(router.route("").await.is_none());
        assert!(router.route("   \n").await.is_none());
        assert!(router.route("fix it").await.is_none());
        assert!(router.route("/compact the conversation").await.is_none());
        assert!(router.route("  /help me please").await.is_none());
    }

    #[tokio::test]
    async fn rules_only_routes_without_side_effects() {
        let mut router = rules_only();
        let decision = router.route("what is a regex?").await.unwrap();
        assert_eq!(decision.result.route, Route::Fast);
        assert_eq!(decision.result.method, Method::Rules);
        assert!(decision.cache_tier.is_none());

        // Without a cache the same query is classified again.
        let again = router.route("what is a regex?").await.unwrap();
        assert!(again.cache_tier.is_none());
    }

    #[tokio::test]
    async fn router_meta_queries_are_tagged() {
        let mut router = rules_only();
        let decision = router
            .route("why did routewise pick the fast tier for that?")
            .await
            .unwrap();
        assert_eq!(decision.result.metadata.exception_type, Some(ExceptionKind::RouterMeta));
    }

    #[tokio::test]
    async fn empty_marker_disables_command_gate() {
        let settings = RouterSettings {
            command_marker: String::new(),
            ..RouterSettings::default()
        };
        let mut router = DecisionRouter::new(settings).unwrap();
        assert!(router.route("/usr/bin is missing from PATH").await.is_some());
    }

    #[test]
    fn decision_serializes_flat() {
        let decision = Decision {
            result: ClassificationResult::new(Route::Deep, 0.9, vec!["x".into()], Method::Rules),
            fingerprint: fingerprint("anything at all"),
            cache_tier: Some(Tier::Memory),
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["route"], "deep");
        assert_eq!(json["cache_tier"], "memory");
        assert!(json.get("fingerprint").is_none());
    }
}
