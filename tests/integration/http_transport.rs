//! HttpTransport against real sockets.

use crate::integration::mock_server::{refused_addr, silent_server, test_config, MockServerFixture};
use fast_requests::transport::Transport;
use fast_requests::types::{FailureKind, Outcome, Request, RequestBody};
use fast_requests::HttpTransport;
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_get_with_query_and_headers() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_with(|s| {
            s.mock("GET", "/v2/10.1000/182")
                .match_query(Matcher::UrlEncoded("email".into(), "me@example.com".into()))
                .match_header("x-api-key", "secret")
                .with_status(200)
                .with_body(r#"{"doi":"10.1000/182","is_oa":true}"#)
        })
        .await;

    let request = Request::get("doi-1", fixture.url("/v2/10.1000/182"))
        .unwrap()
        .with_param("email", "me@example.com")
        .with_header("x-api-key", "secret");
    let response = fixture.transport().send(&request).await.unwrap();

    assert_eq!(response.status_code, 200);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["is_oa"], true);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_default_headers_sent_and_overridable() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_with(|s| {
            s.mock("GET", "/items")
                .match_header("user-agent", "batch-client/1.0")
                .match_header("x-tenant", "override")
                .with_status(204)
        })
        .await;

    let transport = HttpTransport::with_config(
        test_config()
            .with_default_header("user-agent", "batch-client/1.0")
            .with_default_header("x-tenant", "default"),
    )
    .unwrap();
    let request = Request::get("a", fixture.url("/items"))
        .unwrap()
        .with_header("x-tenant", "override");

    let response = transport.send(&request).await.unwrap();
    assert_eq!(response.status_code, 204);
    assert!(response.body.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_json_body() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_with(|s| {
            s.mock("POST", "/lookup")
                .match_header("content-type", "application/json")
                .match_body(Matcher::Json(json!({"ids": [1, 2, 3]})))
                .with_status(201)
                .with_body("created")
        })
        .await;

    let request = Request::post("p", fixture.url("/lookup"))
        .unwrap()
        .with_body(RequestBody::json(json!({"ids": [1, 2, 3]})));
    let response = fixture.transport().send(&request).await.unwrap();

    assert_eq!(response.status_code, 201);
    assert_eq!(response.text(), "created");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_form_body() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_with(|s| {
            s.mock("POST", "/form")
                .match_body(Matcher::AllOf(vec![
                    Matcher::UrlEncoded("name".into(), "ada".into()),
                    Matcher::UrlEncoded("lang".into(), "en".into()),
                ]))
                .with_status(200)
        })
        .await;

    let request = Request::post("f", fixture.url("/form"))
        .unwrap()
        .with_body(RequestBody::form([("name", "ada"), ("lang", "en")]));
    let response = fixture.transport().send(&request).await.unwrap();

    assert_eq!(response.status_code, 200);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_is_still_a_response() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_get("/missing", 404, r#"{"error":"not found"}"#, 1).await;

    let request = Request::get("m", fixture.url("/missing")).unwrap();
    let outcome = fixture.transport().execute(&request).await;

    assert_eq!(outcome.status_code(), Some(404));
}

#[tokio::test]
async fn test_connection_refused_is_connect_failure() {
    let addr = refused_addr();
    let request = Request::get("r", format!("http://{}/", addr)).unwrap();

    let outcome = HttpTransport::with_config(test_config())
        .unwrap()
        .execute(&request)
        .await;

    match outcome {
        Outcome::TransportFailure { kind, cause } => {
            assert_eq!(kind, FailureKind::Connect);
            assert!(!cause.is_empty());
        }
        other => panic!("expected transport failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let addr = silent_server().await;
    let transport =
        HttpTransport::with_config(test_config().with_timeout(Duration::from_millis(200))).unwrap();
    let request = Request::get("t", format!("http://{}/slow", addr)).unwrap();

    let outcome = transport.execute(&request).await;

    assert!(matches!(
        outcome,
        Outcome::TransportFailure {
            kind: FailureKind::Timeout,
            ..
        }
    ));
}
