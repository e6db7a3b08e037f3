// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests running the `routewise` binary.
//!
//! Each test points every state file into its own temp directory and
//! disables escalation, so runs are isolated and offline.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::{TempDir, tempdir};

fn routewise(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_routewise"));
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .env("XDG_DATA_HOME", dir.join("data"))
        .env_remove("RUST_LOG")
        .env_remove("ANTHROPIC_API_KEY")
        .env("ROUTEWISE_ESCALATION_ENABLED", "false")
        .env("ROUTEWISE_CACHE_PATH", dir.join("cache.json"))
        .env("ROUTEWISE_SESSION_PATH", dir.join("session.json"))
        .env("ROUTEWISE_STATS_PATH", dir.join("router-stats.json"))
        .env("ROUTEWISE_LEARNING_STATE_PATH", dir.join("learning-state.json"))
        .env("ROUTEWISE_LEARNING_KNOWLEDGE_DIR", dir.join("knowledge"));
    cmd
}

fn hook(dir: &Path, stdin: &str) -> Output {
    let mut child = routewise(dir)
        .arg("hook")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn workspace() -> TempDir {
    tempdir().unwrap()
}

#[test]
fn hook_emits_directive_for_deep_prompt() {
    let dir = workspace();
    let output = hook(
        dir.path(),
        r#"{"prompt": "compare the trade-offs of this architecture across multiple modules"}"#,
    );
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    let inner = &json["hookSpecificOutput"];
    assert_eq!(inner["hookEventName"], "UserPromptSubmit");
    let context = inner["additionalContext"].as_str().unwrap();
    assert!(context.contains("Route: deep | Model: Opus (Orchestrator) | Confidence: 95%"));
    assert!(context.contains("routewise:opus-orchestrator"));
}

#[test]
fn hook_is_silent_and_successful_for_skipped_input() {
    let dir = workspace();
    for input in ["", "garbage", r#"{"prompt": "hi"}"#, r#"{"prompt": "/clear everything now"}"#] {
        let output = hook(dir.path(), input);
        assert!(output.status.success(), "input {input:?}");
        assert!(stdout(&output).is_empty(), "input {input:?}");
    }
}

#[test]
fn repeated_prompt_is_served_from_the_persistent_cache() {
    let dir = workspace();
    let prompt = r#"{"prompt": "audit the security of the payment service"}"#;
    hook(dir.path(), prompt);
    let second = hook(dir.path(), prompt);

    let context = stdout(&second);
    assert!(context.contains("Method: cache"), "{context}");
    assert!(context.contains("Cached: Yes"));

    let cache = routewise(dir.path()).args(["cache", "stats", "--json"]).output().unwrap();
    assert!(cache.status.success());
    let stats: serde_json::Value = serde_json::from_str(&stdout(&cache)).unwrap();
    assert_eq!(stats["entries"], 1);
    assert_eq!(stats["total_hits"], 2);
}

#[test]
fn stats_reflect_hook_invocations() {
    let dir = workspace();
    hook(dir.path(), r#"{"prompt": "what is a regex?"}"#);
    hook(dir.path(), r#"{"prompt": "/compact the session"}"#);

    let output = routewise(dir.path()).args(["stats", "--json"]).output().unwrap();
    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(stats["version"], "1.2");
    assert_eq!(stats["total_queries"], 1);
    assert_eq!(stats["routes"]["fast"], 1);
    assert_eq!(stats["exceptions"]["slash_commands"], 1);
}

#[test]
fn classify_prints_decision_json() {
    let dir = workspace();
    let output = routewise(dir.path())
        .args(["classify", "what", "is", "a", "regex?"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let decision: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(decision["route"], "fast");
    assert_eq!(decision["method"], "rules");

    let rejected = routewise(dir.path()).args(["classify", "hi"]).output().unwrap();
    assert!(!rejected.status.success());
}

#[test]
fn cache_clear_empties_the_store() {
    let dir = workspace();
    hook(dir.path(), r#"{"prompt": "audit the security of the payment service"}"#);

    let clear = routewise(dir.path()).args(["cache", "clear"]).output().unwrap();
    assert!(clear.status.success());

    let cache = routewise(dir.path()).args(["cache", "stats", "--json"]).output().unwrap();
    let stats: serde_json::Value = serde_json::from_str(&stdout(&cache)).unwrap();
    assert_eq!(stats["entries"], 0);
}

#[test]
fn invalid_config_falls_back_to_defaults() {
    let dir = workspace();
    std::fs::write(dir.path().join("routewise.toml"), "[router]\nconfidence_treshold = 0.5\n").unwrap();

    let output = hook(dir.path(), r#"{"prompt": "what is a regex?"}"#);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Route: fast"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("default configuration"));
}
