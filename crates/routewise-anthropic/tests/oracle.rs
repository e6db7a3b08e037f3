// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end oracle tests against a mocked Messages API.

use std::time::Duration;

use routewise_anthropic::{AnthropicEscalation, CredentialSource};
use routewise_config::model::EscalationConfig;
use routewise_core::{EscalationOracle, Method, Route, RoutewiseError};
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "msg_oracle",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "model": "claude-haiku-4-5-20251001",
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 120, "output_tokens": 30}
    })
}

fn key_file(dir: &tempfile::TempDir) -> CredentialSource {
    let path = dir.path().join("api_key");
    std::fs::write(&path, "sk-ant-test-key").unwrap();
    CredentialSource::new("ROUTEWISE_ORACLE_TEST_UNSET", vec![path])
}

fn config(server: &MockServer) -> EscalationConfig {
    EscalationConfig {
        base_url: server.uri(),
        timeout_secs: 2,
        ..EscalationConfig::default()
    }
}

#[tokio::test]
async fn fenced_answer_becomes_escalation_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-api-key", "sk-ant-test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "claude-haiku-4-5-20251001",
            "max_tokens": 150
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(
            "```json\n{\"route\": \"deep\", \"confidence\": 0.88, \"signals\": [\"system design\"], \"tool_intensive\": false}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let oracle = AnthropicEscalation::from_config(&config(&server), &key_file(&dir)).unwrap();
    let result = oracle.classify("how should we shard this service").await.unwrap();

    assert_eq!(result.route, Route::Deep);
    assert_eq!(result.method, Method::Escalation);
    assert_eq!(result.signals, vec!["system design"]);
    assert_eq!(oracle.name(), "anthropic");
}

#[tokio::test]
async fn prose_answer_is_an_escalation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("Probably standard.")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let oracle = AnthropicEscalation::from_config(&config(&server), &key_file(&dir)).unwrap();
    let err = oracle.classify("fix the flaky login test").await.unwrap_err();
    assert!(matches!(err, RoutewiseError::Escalation { .. }), "got: {err:?}");
}

#[tokio::test]
async fn slow_oracle_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply(r#"{"route":"fast","confidence":0.9}"#))
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cfg = EscalationConfig {
        timeout_secs: 1,
        ..config(&server)
    };
    let oracle = AnthropicEscalation::from_config(&cfg, &key_file(&dir)).unwrap();
    let err = oracle.classify("what is a monad anyway").await.unwrap_err();
    assert!(matches!(err, RoutewiseError::Timeout { .. }), "got: {err:?}");
}

#[test]
fn missing_credential_prevents_construction() {
    let dir = tempfile::tempdir().unwrap();
    let source = CredentialSource::new("ROUTEWISE_ORACLE_TEST_UNSET", vec![dir.path().join("none")]);
    let err = AnthropicEscalation::from_config(&EscalationConfig::default(), &source).unwrap_err();
    assert!(matches!(err, RoutewiseError::Credential));
}
