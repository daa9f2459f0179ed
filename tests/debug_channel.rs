//! Diagnostic channel and debug receiver

mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use common::*;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use superbed_uploader::{
    HandleOutcome,
    debug::{DebugSink, HttpDebugSink},
    host::ReqwestTransport,
    server::{AppState, app::create_app_with_state},
};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_enabled_channel_posts_redacted_traces() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"err": 0, "urls": {"0": "https://a"}})),
        )
        .mount(&provider)
        .await;

    let receiver = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("<binary 1 bytes: img0.png>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&receiver)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("Content-Type", "text/plain"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&receiver)
        .await;

    let mut settings = settings_for(&provider);
    settings.debug.enabled = true;
    settings.debug.endpoint = format!("{}/", receiver.uri());

    let t = TestPlugin::paid(&settings);
    let mut ctx = context(1);
    assert_eq!(
        t.plugin.handle(&mut ctx).await,
        HandleOutcome::Uploaded { count: 1 }
    );

    let traces: Vec<String> = receiver
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect();
    assert!(traces.iter().any(|t| t.starts_with("request: ")));
    assert!(traces.iter().any(|t| t.starts_with("response: ")));
}

async fn mount_receiver() -> MockServer {
    let receiver = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&receiver)
        .await;
    receiver
}

async fn received_traces(receiver: &MockServer) -> Vec<String> {
    receiver
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}

#[tokio::test]
async fn test_free_tier_traces_hide_session_token() {
    let provider = MockServer::start().await;
    mount_free_session(&provider).await;
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(BatchResponder::default())
        .mount(&provider)
        .await;
    let receiver = mount_receiver().await;

    let mut settings = settings_for(&provider);
    settings.debug.enabled = true;
    settings.debug.endpoint = format!("{}/", receiver.uri());

    let t = TestPlugin::free(&settings);
    let mut ctx = context(2);
    assert_eq!(
        t.plugin.handle(&mut ctx).await,
        HandleOutcome::Uploaded { count: 2 }
    );

    let traces = received_traces(&receiver).await;
    assert!(traces.iter().any(|t| t.contains("\"Cookie\":\"<redacted>\"")));
    assert!(traces.iter().all(|t| !t.contains("token=sess")));
    assert!(traces.iter().all(|t| !t.contains("\"sess\"")));
    assert!(traces.iter().all(|t| !t.contains("\"pw\"")));
}

#[tokio::test]
async fn test_traces_skip_configured_proxy() {
    let provider = MockServer::start().await;
    let receiver = mount_receiver().await;

    let mut settings = settings_for(&provider);
    settings.network.all_proxy = Some("http://127.0.0.1:1".to_string());
    settings.debug.enabled = true;
    settings.debug.endpoint = format!("{}/", receiver.uri());

    let t = TestPlugin::paid(&settings);
    assert_eq!(t.plugin.handle(&mut context(1)).await, HandleOutcome::Failed);

    // provider traffic died at the proxy, traces still reached the receiver
    assert!(provider.received_requests().await.unwrap().is_empty());
    let traces = received_traces(&receiver).await;
    assert!(traces.iter().any(|t| t.starts_with("request: ")));
    assert!(traces.iter().any(|t| t.starts_with("transport error: ")));
}

#[tokio::test]
async fn test_disabled_channel_sends_nothing() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"err": 0, "urls": {"0": "https://a"}})),
        )
        .mount(&provider)
        .await;

    let receiver = MockServer::start().await;
    let mut settings = settings_for(&provider);
    settings.debug.endpoint = format!("{}/", receiver.uri());

    let t = TestPlugin::paid(&settings);
    t.plugin.handle(&mut context(1)).await;

    assert!(receiver.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_receiver_accepts_traces_from_sink() {
    let state = AppState::default();
    let app = create_app_with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let transport = Arc::new(ReqwestTransport::new(&Default::default()).unwrap());
    let sink = HttpDebugSink::new(transport, format!("http://{}/", addr));
    sink.emit("login response: {\"err\":0}").await;
    sink.emit("resolve response: {\"err\":0}").await;

    assert_eq!(state.received.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_receiver_oneshot_empty_ok() {
    let response = create_app_with_state(AppState::default())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::from("hello"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.is_empty());
}
