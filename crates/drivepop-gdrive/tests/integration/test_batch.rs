//! Integration tests for batched trash requests

use drivepop_core::ports::ICloudProvider;
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, rid};

#[tokio::test]
async fn test_trash_items_sends_one_batch_with_a_part_per_item() {
    let (server, provider) = common::setup_drive_mock().await;

    let body = common::batch_response(
        "resp_b",
        &[
            ("response-item-0", "200 OK", r#"{"id":"y1"}"#),
            ("response-item-1", "200 OK", r#"{"id":"dup1"}"#),
        ],
    );
    Mock::given(method("POST"))
        .and(path("/batch/drive/v3"))
        .and(header_regex("content-type", "^multipart/mixed; boundary=.+"))
        .and(body_string_contains("PATCH /drive/v3/files/y1"))
        .and(body_string_contains("PATCH /drive/v3/files/dup1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "multipart/mixed; boundary=resp_b"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcomes = provider
        .trash_items(&[rid("y1"), rid("dup1")])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.is_success()));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent = String::from_utf8(requests[0].body.clone()).unwrap();
    assert_eq!(sent.matches(r#"{"trashed":true}"#).count(), 2);
}

#[tokio::test]
async fn test_trash_items_isolates_failed_sub_request() {
    let (server, provider) = common::setup_drive_mock().await;

    // Parts come back out of order; the failure belongs to b2.
    let body = common::batch_response(
        "resp_c",
        &[
            (
                "response-item-1",
                "403 Forbidden",
                r#"{"error":{"code":403,"message":"Insufficient permissions"}}"#,
            ),
            ("response-item-0", "200 OK", r#"{"id":"a1"}"#),
            ("response-item-2", "200 OK", r#"{"id":"c3"}"#),
        ],
    );
    Mock::given(method("POST"))
        .and(path("/batch/drive/v3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "multipart/mixed; boundary=resp_c"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcomes = provider
        .trash_items(&[rid("a1"), rid("b2"), rid("c3")])
        .await
        .unwrap();

    assert!(outcomes[0].is_success());
    assert_eq!(outcomes[1].id, rid("b2"));
    assert_eq!(
        outcomes[1].result,
        Err("HTTP 403: Insufficient permissions".to_string())
    );
    assert!(outcomes[2].is_success());
}

#[tokio::test]
async fn test_trash_items_empty_sends_nothing() {
    let (server, provider) = common::setup_drive_mock().await;

    let outcomes = provider.trash_items(&[]).await.unwrap();

    assert!(outcomes.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_trash_batch_rejected_as_a_whole_is_an_error() {
    let (server, provider) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/batch/drive/v3"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad batch"))
        .mount(&server)
        .await;

    assert!(provider.trash_items(&[rid("a1")]).await.is_err());
}

fn numbered_ids(count: usize) -> Vec<drivepop_core::domain::RemoteId> {
    (0..count).map(|i| rid(&format!("f{i}"))).collect()
}

fn all_ok_response(boundary: &str, positions: std::ops::Range<usize>) -> String {
    let content_ids: Vec<String> = positions.map(|i| format!("response-item-{i}")).collect();
    let parts: Vec<(&str, &str, &str)> = content_ids
        .iter()
        .map(|cid| (cid.as_str(), "200 OK", r#"{"id":"x"}"#))
        .collect();
    common::batch_response(boundary, &parts)
}

#[tokio::test]
async fn test_trash_items_splits_into_batches_of_one_hundred() {
    let (server, provider) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/batch/drive/v3"))
        .and(body_string_contains("Content-ID: <item-100>"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(all_ok_response("second", 100..101), "multipart/mixed; boundary=second"),
        )
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/batch/drive/v3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(all_ok_response("first", 0..100), "multipart/mixed; boundary=first"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ids = numbered_ids(101);
    let outcomes = provider.trash_items(&ids).await.unwrap();

    assert_eq!(outcomes.len(), 101);
    assert!(outcomes.iter().all(|o| o.is_success()));
    let order: Vec<_> = outcomes.iter().map(|o| o.id.clone()).collect();
    assert_eq!(order, ids);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let first = String::from_utf8(requests[0].body.clone()).unwrap();
    let second = String::from_utf8(requests[1].body.clone()).unwrap();
    assert_eq!(first.matches("Content-Type: application/http").count(), 100);
    assert_eq!(second.matches("Content-Type: application/http").count(), 1);
    assert!(second.contains("PATCH /drive/v3/files/f100?"));
}

#[tokio::test]
async fn test_failed_second_batch_keeps_first_batch_outcomes() {
    let (server, provider) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/batch/drive/v3"))
        .and(body_string_contains("Content-ID: <item-100>"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/batch/drive/v3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(all_ok_response("first", 0..100), "multipart/mixed; boundary=first"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcomes = provider.trash_items(&numbered_ids(101)).await.unwrap();

    assert_eq!(outcomes.len(), 101);
    assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 100);
    let last = &outcomes[100];
    assert_eq!(last.id, rid("f100"));
    let message = last.result.clone().unwrap_err();
    assert!(message.starts_with("batch request failed"), "{message}");
}
