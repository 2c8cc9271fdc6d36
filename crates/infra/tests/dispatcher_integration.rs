//! Integration tests for the signed dispatcher against a mock HTTP server

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use conduit_core::ports::{ApiRequest, RestDispatcher};
use conduit_domain::constants::{
    HEADER_SESSION_TOKEN, HEADER_SIGNATURE, HEADER_SIGNATURE_TIMESTAMP, HEADER_USER_ID,
};
use conduit_domain::{ClientConfig, ConduitError, Endpoint};
use conduit_infra::api::signing::sign;
use conduit_infra::SignedDispatcher;
use serde_json::json;
use support::{header, signed_config, test_config, API_KEY, USER};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher(config: &ClientConfig) -> SignedDispatcher {
    SignedDispatcher::from_config(config).expect("dispatcher")
}

#[tokio::test]
async fn signed_request_carries_identity_headers() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repo/v1/entity/syn42/table/query/async/start"))
        .and(body_json(json!({"sql": "select 1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "t-1"})))
        .expect(1)
        .mount(&server)
        .await;
    let dispatcher = dispatcher(&signed_config(&server.uri()));

    // Act
    let request = ApiRequest::post(Endpoint::Repo, "/entity/syn42/table/query/async/start")
        .with_query("verbose", "true")
        .with_json(&json!({"sql": "select 1"}))
        .unwrap();
    let response = dispatcher.dispatch(request).await.expect("dispatch");

    // Assert
    assert_eq!(response.status, 201);
    let requests = server.received_requests().await.unwrap();
    let sent = &requests[0];
    assert_eq!(header(sent, "user-agent"), Some("conduit-tests/1.0"));
    assert_eq!(header(sent, HEADER_USER_ID), Some(USER));

    let timestamp = header(sent, HEADER_SIGNATURE_TIMESTAMP).expect("timestamp header");
    let expected =
        sign(USER, API_KEY, "/repo/v1/entity/syn42/table/query/async/start", timestamp).unwrap();
    assert_eq!(header(sent, HEADER_SIGNATURE), Some(expected.as_str()));
    assert!(header(sent, HEADER_SESSION_TOKEN).is_none());
}

#[tokio::test]
async fn unsigned_request_sends_no_identity_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file/v1/fileHandle/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "12"})))
        .mount(&server)
        .await;
    let mut config = test_config(&server.uri());
    config.session_token = Some("session-abc".into());

    dispatcher(&config).dispatch(ApiRequest::get(Endpoint::File, "/fileHandle/12")).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let sent = &requests[0];
    assert_eq!(header(sent, HEADER_SESSION_TOKEN), Some("session-abc"));
    assert!(header(sent, HEADER_USER_ID).is_none());
    assert!(header(sent, HEADER_SIGNATURE).is_none());
    assert!(header(sent, HEADER_SIGNATURE_TIMESTAMP).is_none());
}

#[tokio::test]
async fn explicit_null_session_header_is_stripped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;
    let mut config = test_config(&server.uri());
    config.session_token = Some("session-abc".into());

    let request = ApiRequest::get(Endpoint::Auth, "/session").with_header(HEADER_SESSION_TOKEN, None);
    dispatcher(&config).dispatch(request).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(header(&requests[0], HEADER_SESSION_TOKEN).is_none());
    assert_eq!(requests[0].url.path(), "/auth/v1/session");
}

#[tokio::test]
async fn query_parameters_are_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/file/v1/file/multipart/u-1/add/3"))
        .and(query_param("partMD5Hex", "0cc175b9c0f1b6a831c399e269772661"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"partNumber": 3, "addPartState": "ADD_SUCCESS"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = ApiRequest::put(Endpoint::File, "/file/multipart/u-1/add/3")
        .with_query("partMD5Hex", "0cc175b9c0f1b6a831c399e269772661");
    dispatcher(&test_config(&server.uri())).dispatch(request).await.unwrap();
}

#[tokio::test]
async fn busy_server_is_retried_until_it_answers() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    Mock::given(method("GET"))
        .respond_with(move |_req: &wiremock::Request| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(503)
            } else {
                ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#)
            }
        })
        .mount(&server)
        .await;

    let response = dispatcher(&signed_config(&server.uri()))
        .dispatch(ApiRequest::get(Endpoint::Repo, "/version"))
        .await
        .unwrap();

    assert_eq!(response.body, r#"{"ok":true}"#);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_retries_raise_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = dispatcher(&test_config(&server.uri()))
        .dispatch(ApiRequest::get(Endpoint::Repo, "/version"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConduitError::ServiceUnavailable { attempts: 3, .. }), "{err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn client_error_carries_server_reason_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"reason": "upload already completed"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = ApiRequest::post(Endpoint::File, "/file/multipart").with_json(&json!({})).unwrap();
    let err = dispatcher(&test_config(&server.uri())).dispatch(request).await.unwrap_err();

    match err {
        ConduitError::Client { status, reason } => {
            assert_eq!(status, 409);
            assert_eq!(reason, "upload already completed");
        }
        other => panic!("expected Client error, got {other:?}"),
    }
}

#[tokio::test]
async fn status_mapping_distinguishes_auth_missing_and_server() {
    let server = MockServer::start().await;
    Mock::given(path("/repo/v1/forbidden"))
        .respond_with(ResponseTemplate::new(403).set_body_string("not allowed"))
        .mount(&server)
        .await;
    Mock::given(path("/repo/v1/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"reason": "no such entity"})))
        .mount(&server)
        .await;
    Mock::given(path("/repo/v1/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    let dispatcher = dispatcher(&test_config(&server.uri()));

    let forbidden = dispatcher.dispatch(ApiRequest::get(Endpoint::Repo, "/forbidden")).await;
    let missing = dispatcher.dispatch(ApiRequest::get(Endpoint::Repo, "/missing")).await;
    let broken = dispatcher.dispatch(ApiRequest::get(Endpoint::Repo, "/broken")).await;

    assert!(matches!(forbidden, Err(ConduitError::Auth(ref msg)) if msg.contains("not allowed")));
    assert!(matches!(missing, Err(ConduitError::NotFound(ref msg)) if msg == "no such entity"));
    assert!(matches!(broken, Err(ConduitError::Server { status: 500, ref reason }) if reason == "boom"));
}
