// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation oracle backed by a small Anthropic model.
//!
//! The model is asked for a single JSON object and nothing else. Answers
//! wrapped in a Markdown code fence are unwrapped; anything that does not
//! decode to a known route is rejected so the caller keeps its own result.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use routewise_config::model::EscalationConfig;
use routewise_core::{
    ClassificationResult, EscalationOracle, Method, ResultMetadata, Route, RoutewiseError,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::client::AnthropicClient;
use crate::credentials::CredentialSource;
use crate::types::MessageRequest;

/// Maximum number of signals kept from an oracle answer.
pub const MAX_ORACLE_SIGNALS: usize = 3;

/// Build the classification prompt for `query`.
pub fn build_prompt(query: &str) -> String {
    // JSON-encode the query so embedded quotes cannot break out of the prompt.
    let quoted = serde_json::to_string(query).unwrap_or_else(|_| format!("\"{query}\""));
    format!(
        r#"Classify this coding query into exactly one route. Return ONLY valid JSON, no other text.

Query: {quoted}

Routes:
- "fast": Simple factual questions, syntax lookups, formatting, git status, JSON/YAML manipulation
- "standard": Bug fixes, feature implementation, code review, refactoring, test writing, OR tool-intensive tasks (codebase search, running tests, multi-file edits)
- "deep": Architecture decisions, system design, security audits, multi-file refactors, trade-off analysis, complex debugging, OR orchestration tasks (multi-step workflows)

Tool-intensity indicators (favor "standard" or "deep" over "fast"):
- Searching/scanning entire codebase
- Modifying multiple files
- Running tests or builds
- Dependency analysis
- Large-scale refactoring

Return JSON only:
{{"route": "fast|standard|deep", "confidence": 0.0-1.0, "signals": ["signal1", "signal2"], "tool_intensive": true|false}}"#
    )
}

/// Unwrap a Markdown code fence (with or without a `json` tag).
pub fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(start) = text.find("```") else {
        return text;
    };
    let inner = &text[start + 3..];
    let inner = match inner.find("```") {
        Some(end) => &inner[..end],
        None => inner,
    };
    let inner = inner.trim_start();
    inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner)
        .trim()
}

#[derive(Debug, Deserialize)]
struct OracleAnswer {
    route: String,
    confidence: f64,
    #[serde(default)]
    signals: Vec<String>,
    #[serde(default)]
    tool_intensive: bool,
}

/// Decode an oracle answer into an escalation result.
pub fn parse_answer(text: &str) -> Result<ClassificationResult, RoutewiseError> {
    let body = strip_fences(text);
    let answer: OracleAnswer = serde_json::from_str(body).map_err(|e| RoutewiseError::Escalation {
        message: format!("oracle answer is not the expected JSON object: {e}"),
        source: Some(Box::new(e)),
    })?;

    let route = Route::from_str(answer.route.trim()).map_err(|_| {
        RoutewiseError::escalation(format!("oracle returned unknown route {:?}", answer.route))
    })?;

    let signals = answer.signals.into_iter().take(MAX_ORACLE_SIGNALS).collect();
    Ok(
        ClassificationResult::new(route, answer.confidence, signals, Method::Escalation)
            .with_metadata(ResultMetadata {
                tool_intensive: answer.tool_intensive,
                ..ResultMetadata::default()
            }),
    )
}

/// [`EscalationOracle`] implementation over the Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicEscalation {
    client: AnthropicClient,
    model: String,
    max_tokens: u32,
}

impl AnthropicEscalation {
    pub fn new(client: AnthropicClient, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens,
        }
    }

    /// Build an oracle from config, resolving the API key from `credentials`.
    ///
    /// Fails with [`RoutewiseError::Credential`] when no key is available.
    pub fn from_config(
        config: &EscalationConfig,
        credentials: &CredentialSource,
    ) -> Result<Self, RoutewiseError> {
        let api_key = credentials.resolve()?;
        let client = AnthropicClient::new(
            &api_key,
            &config.api_version,
            Duration::from_secs(config.timeout_secs),
        )?
        .with_base_url(config.base_url.clone());
        Ok(Self::new(client, config.model.clone(), config.max_tokens))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EscalationOracle for AnthropicEscalation {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn classify(&self, query: &str) -> Result<ClassificationResult, RoutewiseError> {
        let request = MessageRequest::user(&self.model, build_prompt(query), self.max_tokens);
        let response = self.client.complete_message(&request).await?;
        let text = response.text();
        debug!(
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "oracle answered"
        );

        let result = parse_answer(&text)?;
        info!(route = %result.route, confidence = result.confidence, "escalation classified query");
        Ok(result)
    }
}
