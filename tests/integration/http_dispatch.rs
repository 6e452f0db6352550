//! End-to-end dispatches over HTTP.

use crate::common::init_tracing;
use crate::integration::mock_server::{refused_addr, silent_server, test_config, MockServerFixture};
use fast_requests::batch::RejectReason;
use fast_requests::types::FailureKind;
use fast_requests::{BatchStatus, DispatchPolicy, Dispatcher, Request};
use std::time::Duration;

fn quick_policy(accept: impl IntoIterator<Item = u16>) -> DispatchPolicy {
    DispatchPolicy::new(accept)
        .with_rate_limit(2, 0.0)
        .with_retry_backoff_seconds(0.0)
}

#[tokio::test]
async fn test_lookup_batch_keyed_by_id() {
    init_tracing();
    let fixture = MockServerFixture::new().await;
    let dois = ["10.1000/182", "10.1038/nphys1170", "10.1002/0470841559.ch1"];
    let mut mocks = Vec::new();
    for doi in dois {
        let body = format!(r#"{{"doi":"{}"}}"#, doi);
        mocks.push(fixture.mock_get(&format!("/v2/{}", doi), 200, &body, 1).await);
    }

    let requests: Vec<Request> = dois
        .iter()
        .map(|doi| Request::get(*doi, fixture.url(&format!("/v2/{}", doi))).unwrap())
        .collect();
    let result = fixture
        .dispatcher(4)
        .dispatch(requests, &quick_policy([200]))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.len(), 3);
    for doi in dois {
        let body: serde_json::Value = result.get(&doi.into()).unwrap().json().unwrap();
        assert_eq!(body["doi"], doi);
    }
    for mock in mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_extra_accept_codes_keep_their_responses() {
    let fixture = MockServerFixture::new().await;
    let _found = fixture.mock_get("/found", 200, "{}", 1).await;
    let _gone = fixture.mock_get("/gone", 404, r#"{"error":"not found"}"#, 1).await;

    let requests = vec![
        Request::get("found", fixture.url("/found")).unwrap(),
        Request::get("gone", fixture.url("/gone")).unwrap(),
    ];
    let result = fixture
        .dispatcher(2)
        .dispatch(requests, &quick_policy([200, 404]))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.get(&"gone".into()).unwrap().status_code, 404);
}

#[tokio::test]
async fn test_server_error_then_recovery() {
    init_tracing();
    let fixture = MockServerFixture::new().await;
    let _ok = fixture.mock_get("/stable", 200, "stable", 2).await;
    // A mock with hits outstanding wins over later ones, so the 500 is served first.
    let first = fixture.mock_get("/flaky", 500, "oops", 1).await;
    let second = fixture.mock_get("/flaky", 200, "recovered", 1).await;

    let requests = vec![
        Request::get("stable", fixture.url("/stable")).unwrap(),
        Request::get("flaky", fixture.url("/flaky")).unwrap(),
    ];
    let result = fixture
        .dispatcher(2)
        .dispatch(requests, &quick_policy([200]).with_max_retry(1))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.stats.attempts, 2);
    assert_eq!(result.get(&"flaky".into()).unwrap().text(), "recovered");
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_persistent_error_stops_batch() {
    let fixture = MockServerFixture::new().await;
    let first_chunk = fixture.mock_get("/ok", 200, "ok", 1).await;
    let failing = fixture.mock_get("/down", 503, "unavailable", 2).await;
    let never = fixture.mock_get("/later", 200, "later", 0).await;

    let requests = vec![
        Request::get("ok", fixture.url("/ok")).unwrap(),
        Request::get("down", fixture.url("/down")).unwrap(),
        Request::get("later", fixture.url("/later")).unwrap(),
    ];
    let policy = DispatchPolicy::new([200])
        .with_rate_limit(1, 0.0)
        .with_max_retry(1)
        .with_retry_backoff_seconds(0.0);
    let result = fixture.dispatcher(2).dispatch(requests, &policy).await.unwrap();

    assert_eq!(
        result.status,
        BatchStatus::PartialFailure {
            chunk_index: 1,
            attempts: 2,
            reason: RejectReason::UnacceptableStatus { codes: vec![503] },
        }
    );
    assert_eq!(result.len(), 1);
    assert!(result.get(&"ok".into()).is_some());
    first_chunk.assert_async().await;
    failing.assert_async().await;
    never.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_host_reports_connect_failure() {
    let addr = refused_addr();
    let dispatcher = Dispatcher::builder()
        .transport_config(test_config())
        .max_workers(1)
        .build()
        .unwrap();
    let requests = vec![Request::get("r", format!("http://{}/", addr)).unwrap()];

    let result = dispatcher
        .dispatch(requests, &quick_policy([200]).with_max_retry(1))
        .await
        .unwrap();

    assert!(result.is_empty());
    match &result.status {
        BatchStatus::PartialFailure {
            attempts, reason, ..
        } => {
            assert_eq!(*attempts, 2);
            assert!(matches!(
                reason,
                RejectReason::TransportFailure {
                    kind: FailureKind::Connect,
                    ..
                }
            ));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(result.status_message().starts_with("transport error (connect)"));
}

#[tokio::test]
async fn test_timeout_rejects_whole_chunk() {
    let fixture = MockServerFixture::new().await;
    let _fast = fixture.mock_get("/fast", 200, "fast", 1).await;
    let silent = silent_server().await;

    let dispatcher = Dispatcher::builder()
        .transport_config(test_config().with_timeout(Duration::from_millis(200)))
        .max_workers(2)
        .build()
        .unwrap();
    let requests = vec![
        Request::get("fast", fixture.url("/fast")).unwrap(),
        Request::get("slow", format!("http://{}/slow", silent)).unwrap(),
    ];

    let result = dispatcher
        .dispatch(requests, &quick_policy([200]).with_max_retry(0))
        .await
        .unwrap();

    // The fast response is discarded with its chunk.
    assert!(result.is_empty());
    assert!(result.status_message().starts_with("transport error (timeout)"));
}
