//! HttpTransport against a mock workflow server

use foundry::{HttpTransport, TransportError, WorkflowTransport};
use foundry_common::{ApprovalRequest, GenerateRequest, Severity, WorkflowStatus};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn halted_body() -> serde_json::Value {
    json!({
        "thread_id": "t1",
        "status": "halted",
        "current_draft": "# Draft",
        "safety_flags": [
            {"line": 4, "severity": "Moderate", "issue": "Pacing", "suggestion": "Slow down"}
        ],
        "clinical_feedback": "Solid structure",
        "empathy_score": 72.5,
        "safety_score": 91,
        "agent_notes": {"drafter": ["Drafted v1"], "safety_guardian": []},
        "iteration_count": 1
    })
}

#[tokio::test]
async fn generate_posts_intent_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_json(json!({
            "user_intent": "Exposure hierarchy",
            "original_query": "I avoid crowds"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(halted_body()))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&server.uri(), None).unwrap();
    let state = transport
        .generate(&GenerateRequest::new("Exposure hierarchy", "I avoid crowds"))
        .await
        .unwrap();

    assert_eq!(state.thread_id, "t1");
    assert_eq!(state.status, WorkflowStatus::Halted);
    assert_eq!(state.safety_flags[0].severity, Severity::Moderate);
    assert_eq!(state.safety_score, 91.0);
    assert_eq!(state.iteration_count, 1);
}

#[tokio::test]
async fn approve_posts_full_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/approve"))
        .and(body_json(json!({
            "thread_id": "t1",
            "human_approval": true,
            "human_edits": "# Edited"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "thread_id": "t1",
            "status": "finalized",
            "final_protocol": "# Edited"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&server.uri(), None).unwrap();
    let reply = transport
        .approve(&ApprovalRequest::new("t1", "# Edited"))
        .await
        .unwrap();

    assert_eq!(reply.status, WorkflowStatus::Finalized);
    assert_eq!(reply.final_protocol, "# Edited");
}

#[tokio::test]
async fn error_status_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"detail": "rate limited"})))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&server.uri(), None).unwrap();
    let err = transport
        .generate(&GenerateRequest::new("goal", "goal"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Status { status: 429, .. }));
    assert_eq!(err.detail(), Some("rate limited"));
}

#[tokio::test]
async fn non_json_error_body_has_no_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&server.uri(), None).unwrap();
    let err = transport
        .generate(&GenerateRequest::new("goal", "goal"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Status { status: 502, detail: None }));
}

#[tokio::test]
async fn malformed_success_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "halted"})))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&server.uri(), None).unwrap();
    let err = transport
        .generate(&GenerateRequest::new("goal", "goal"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Decode(_)));
    assert_eq!(err.detail(), None);
}

#[tokio::test]
async fn unreachable_server_is_request_error() {
    // Nothing listens on the discard port
    let transport = HttpTransport::new("http://127.0.0.1:9", None).unwrap();
    let err = transport.health().await.unwrap_err();
    assert!(matches!(err, TransportError::Request(_)));
}

#[tokio::test]
async fn read_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "ok", "service": "cerina-foundry"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/protocol/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "thread_id": "t1",
            "user_intent": "Sleep hygiene",
            "status": "finalized",
            "final_protocol": "# Final",
            "safety_score": 90.0,
            "empathy_score": 80.0,
            "created_at": "2026-03-01T10:00:00"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/protocols"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "protocols": [{
                "thread_id": "t1",
                "user_intent": "Sleep hygiene",
                "status": "halted",
                "safety_score": null,
                "empathy_score": null,
                "created_at": "2026-03-01T10:00:00+00:00"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&server.uri(), None).unwrap();

    let health = transport.health().await.unwrap();
    assert!(health.is_ok());

    let record = transport.fetch_protocol("t1").await.unwrap();
    assert_eq!(record.final_protocol.as_deref(), Some("# Final"));
    assert!(record.created_at_utc().is_some());

    let list = transport.list_protocols(5).await.unwrap();
    assert_eq!(list.count, 1);
    assert_eq!(list.protocols[0].status, WorkflowStatus::Halted);
    assert_eq!(list.protocols[0].safety_score, None);
}

#[tokio::test]
async fn missing_protocol_is_404_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/protocol/nope"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Protocol not found"})),
        )
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&server.uri(), None).unwrap();
    let err = transport.fetch_protocol("nope").await.unwrap_err();
    assert_eq!(err.to_string(), "server returned 404: Protocol not found");
}
