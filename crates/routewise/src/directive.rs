// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing directive rendering.
//!
//! Maps a decision to the execution agent the host should spawn and renders
//! the context block injected into the host conversation.

use std::fmt::Write;

use routewise_core::{ClassificationResult, Route};
use serde::Serialize;

/// Host event the directive answers.
pub const HOOK_EVENT_NAME: &str = "UserPromptSubmit";

/// Execution agent and the model label shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agent {
    pub name: &'static str,
    pub label: &'static str,
}

/// Pick the agent for a decision. Deep orchestrated work goes to the orchestrator.
pub fn agent_for(result: &ClassificationResult) -> Agent {
    match result.route {
        Route::Deep if result.metadata.orchestration => Agent {
            name: "opus-orchestrator",
            label: "Opus (Orchestrator)",
        },
        Route::Fast => Agent {
            name: "fast-executor",
            label: "Haiku",
        },
        Route::Standard => Agent {
            name: "standard-executor",
            label: "Sonnet",
        },
        Route::Deep => Agent {
            name: "deep-executor",
            label: "Opus",
        },
    }
}

/// Render the context block for `result`, naming agents under `namespace`.
pub fn render_context(result: &ClassificationResult, namespace: &str) -> String {
    let agent = agent_for(result);
    let meta = &result.metadata;

    let mut flags = String::new();
    if meta.tool_intensive {
        flags.push_str(" | Tool-intensive: Yes");
    }
    if meta.orchestration {
        flags.push_str(" | Orchestration: Yes");
    }
    if meta.follow_up {
        flags.push_str(" | Follow-up: Yes");
    }
    if meta.cache_hit {
        flags.push_str(" | Cached: Yes");
    }
    if let Some(kind) = meta.exception_type {
        let _ = write!(flags, " | Exception: {kind}");
    }
    if let Some(boost) = &meta.context_boost {
        let _ = write!(flags, " | Context: {boost}");
    }
    if let Some(learned) = &meta.learned_boost {
        let _ = write!(flags, " | Learned: {learned}");
    }

    let percent = (result.confidence * 100.0).round();
    let signals = result.signals.join(", ");
    let agent_ref = format!("{namespace}{}", agent.name);

    format!(
        "[Routewise] MANDATORY ROUTING DIRECTIVE\n\
         Route: {route} | Model: {label} | Confidence: {percent}% | Method: {method}{flags}\n\
         Signals: {signals}\n\
         \n\
         CRITICAL: You MUST use the Task tool NOW to spawn the \"{agent_ref}\" subagent.\n\
         Do NOT respond to the user directly. Do NOT skip this step. Delegate immediately.\n\
         \n\
         Example:\n\
         Task(subagent_type=\"{agent_ref}\", prompt=\"<user's query>\", description=\"Route to {label}\")",
        route = result.route,
        label = agent.label,
        method = result.method,
    )
}

/// Stdout payload of the `hook` command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    pub hook_specific_output: HookSpecificOutput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: &'static str,
    pub additional_context: String,
}

impl HookOutput {
    pub fn new(result: &ClassificationResult, namespace: &str) -> Self {
        Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: HOOK_EVENT_NAME,
                additional_context: render_context(result, namespace),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use routewise_core::{ExceptionKind, Method, ResultMetadata};

    fn result(route: Route) -> ClassificationResult {
        ClassificationResult::new(route, 0.9, vec!["architecture".into(), "security".into()], Method::Rules)
    }

    #[test]
    fn routes_map_to_agents() {
        assert_eq!(agent_for(&result(Route::Fast)).name, "fast-executor");
        assert_eq!(agent_for(&result(Route::Standard)).label, "Sonnet");
        assert_eq!(agent_for(&result(Route::Deep)).name, "deep-executor");

        let orchestrated = result(Route::Deep).with_metadata(ResultMetadata {
            orchestration: true,
            ..ResultMetadata::default()
        });
        let agent = agent_for(&orchestrated);
        assert_eq!(agent.name, "opus-orchestrator");
        assert_eq!(agent.label, "Opus (Orchestrator)");

        // Orchestration without deep keeps the per-route agent.
        let standard = result(Route::Standard).with_metadata(ResultMetadata {
            orchestration: true,
            ..ResultMetadata::default()
        });
        assert_eq!(agent_for(&standard).name, "standard-executor");
    }

    #[test]
    fn context_renders_decision_and_directive() {
        let mut r = result(Route::Deep);
        r.metadata.tool_intensive = true;
        r.metadata.exception_type = Some(ExceptionKind::RouterMeta);
        let context = render_context(&r, "routewise:");

        assert!(context.starts_with("[Routewise] MANDATORY ROUTING DIRECTIVE\n"));
        assert!(context.contains(
            "Route: deep | Model: Opus | Confidence: 90% | Method: rules | Tool-intensive: Yes | Exception: router_meta\n"
        ));
        assert!(context.contains("Signals: architecture, security\n"));
        assert!(context.contains("spawn the \"routewise:deep-executor\" subagent"));
        assert!(context.contains("description=\"Route to Opus\""));
    }

    #[test]
    fn namespace_can_be_empty() {
        let context = render_context(&result(Route::Fast), "");
        assert!(context.contains("spawn the \"fast-executor\" subagent"));
    }

    #[test]
    fn hook_output_shape() {
        let output = HookOutput::new(&result(Route::Standard), "routewise:");
        let json = serde_json::to_value(&output).unwrap();
        let inner = &json["hookSpecificOutput"];
        assert_eq!(inner["hookEventName"], "UserPromptSubmit");
        assert!(inner["additionalContext"].as_str().unwrap().contains("standard-executor"));
    }
}
