mod common;

use axum::{body::Body, http::StatusCode};
use common::{post_json, send, tenant_request, test_app};
use phonebot_models::Thought;
use phonebot_testsupport::{FailingReasoner, ScriptedReasoner, NOTIFICATIONS_EMAIL};
use serde_json::{json, Value};
use std::sync::Arc;

async fn post_with_caller(
    app: &axum::Router,
    uri: &str,
    body: Value,
    caller: &str,
) -> (StatusCode, Value) {
    let request = tenant_request("POST", uri)
        .header("X-Caller-Number", caller)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn first_turn_gets_the_greeting() {
    let reasoner = Arc::new(ScriptedReasoner::say("unused"));
    let t = test_app(reasoner.clone());
    let (status, body) = post_json(&t.app, "/dialog", json!({"goal": "lead", "messages": []})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["say"], "Thanks for calling! Who am I speaking with today?");
    assert_eq!(body["tool"], Value::Null);
    assert_eq!(reasoner.calls(), 0);
}

#[tokio::test]
async fn model_reply_is_forwarded() {
    let t = test_app(Arc::new(ScriptedReasoner::always(Thought {
        say: "Thanks, Alice. Is this still the best number to reach you?".to_string(),
        tool: None,
        args: json!({"name": "Alice", "phone": "8185551234"}).as_object().cloned(),
    })));
    let (status, body) = post_json(
        &t.app,
        "/dialog",
        json!({"goal": "lead", "messages": [{"role": "user", "content": "Hi, this is Alice."}]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["say"].as_str().unwrap().contains("best number"));
    assert_eq!(body["args"]["name"], "Alice");
    assert!(t.notifier.sent().is_empty());
}

#[tokio::test]
async fn callback_creates_lead_and_emails_owner() {
    let t = test_app(Arc::new(ScriptedReasoner::always(Thought {
        say: "Perfect, we'll call you back shortly.".to_string(),
        tool: Some("create_lead".to_string()),
        args: json!({
            "name": "Alice",
            "phone": "555-1234",
            "date": "2025-05-15",
            "city": "Woodland Hills"
        })
        .as_object()
        .cloned(),
    })));
    let (status, body) = post_with_caller(
        &t.app,
        "/dialog",
        json!({"goal": "lead", "messages": [{"role": "user", "content": "Call me back."}]}),
        "8185551234",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tool"], "create_lead");
    assert!(body["tool_result"]["lead_id"].is_string());
    assert_eq!(t.state.repo.lead_count(), 1);

    let sent = t.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, NOTIFICATIONS_EMAIL);
    assert_eq!(sent[0].subject, "New lead for Special Events Rentals");
    assert!(sent[0].text.starts_with("Caller: 8185551234"));
    assert!(sent[0].text.contains("name: Alice"));
    assert!(sent[0].text.contains("city: Woodland Hills"));
}

#[tokio::test]
async fn failing_tool_does_not_fail_the_dialog() {
    let t = test_app(Arc::new(ScriptedReasoner::always(Thought {
        say: "Let me price that.".to_string(),
        tool: Some("quote".to_string()),
        args: json!({"items": []}).as_object().cloned(),
    })));
    let (status, body) = post_json(
        &t.app,
        "/dialog",
        json!({"messages": [{"role": "user", "content": "how much?"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["say"], "Let me price that.");
    assert!(body["tool_result"]["error"]
        .as_str()
        .unwrap()
        .contains("quote requires 'date' and a ZIP"));
}

#[tokio::test]
async fn reasoning_failure_sends_incomplete_lead() {
    let t = test_app(Arc::new(FailingReasoner));
    let (status, body) = post_with_caller(
        &t.app,
        "/dialog",
        json!({"goal": "lead", "messages": [{"role": "user", "content": "I need 40 chairs"}]}),
        "3105550000",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("reason error: "));

    let sent = t.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Incomplete lead for Special Events Rentals");
    assert!(sent[0].text.contains("Caller: 3105550000"));
    assert!(sent[0].text.contains("I need 40 chairs"));
}

#[tokio::test]
async fn call_workflow_collects_details() {
    let t = test_app(Arc::new(ScriptedReasoner::say("unused")));
    let uri = "/calls/CA900/turns";

    let (status, body) =
        post_with_caller(&t.app, uri, json!({"text": "Dana"}), "8185550111").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["say"], "Can I get your phone number please?");
    assert_eq!(body["complete"], false);
    assert_eq!(body["slots"], json!({"name": "Dana"}));

    for (text, prompt) in [
        ("818-555-0111", "What date is your event?"),
        ("June 7th", "What is the zipcode of your event?"),
    ] {
        let (_, body) = post_json(&t.app, uri, json!({ "text": text })).await;
        assert_eq!(body["say"], prompt);
    }

    let (_, body) = post_json(&t.app, uri, json!({"text": "91364"})).await;
    assert_eq!(body["say"], "Thank you, Dana! We've collected everything we need.");
    assert_eq!(body["complete"], true);

    let sent = t.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.starts_with("Caller: 8185550111"));
    assert!(sent[0].text.contains("- zip: 91364"));
    let metrics = t.state.metrics.get_prometheus_metrics().await.unwrap();
    assert!(metrics.contains("phonebot_emails_sent_total 1"));

    let request = tenant_request("DELETE", "/calls/CA900").body(Body::empty()).unwrap();
    let (status, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(t.state.sessions.is_empty());
}
