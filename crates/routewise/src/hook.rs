// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `routewise hook` command implementation.
//!
//! Reads the host's prompt event from stdin and answers with a routing
//! directive on stdout. Any failure produces no output: the host must never
//! be blocked by the router.

use routewise_router::DecisionRouter;
use serde::Deserialize;
use tracing::debug;

use crate::directive::HookOutput;

/// Prompt event sent by the host.
#[derive(Debug, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub prompt: String,
}

/// Handle one hook event. Returns the JSON line to print, if any.
pub async fn run_hook(router: &mut DecisionRouter, namespace: &str, input: &str) -> Option<String> {
    let event: HookInput = match serde_json::from_str(input) {
        Ok(event) => event,
        Err(err) => {
            debug!(error = %err, "hook input is not a prompt event");
            return None;
        }
    };

    let decision = router.route(&event.prompt).await?;
    let output = HookOutput::new(&decision.result, namespace);
    match serde_json::to_string(&output) {
        Ok(line) => Some(line),
        Err(err) => {
            debug!(error = %err, "failed to encode hook output");
            None
        }
    }
}
