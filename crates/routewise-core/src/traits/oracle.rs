// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation oracle trait for higher-cost external classifiers.

use async_trait::async_trait;

use crate::error::RoutewiseError;
use crate::types::ClassificationResult;

/// An external classifier consulted when local confidence is insufficient.
///
/// Implementations make exactly one attempt and return a result with
/// `method = escalation`. Any failure is reported as an error; the caller
/// keeps its own rule-based result.
#[async_trait]
pub trait EscalationOracle: Send + Sync {
    /// Short name for logs (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Classifies a query.
    async fn classify(&self, query: &str) -> Result<ClassificationResult, RoutewiseError>;
}
