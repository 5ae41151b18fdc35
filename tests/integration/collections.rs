//! Collection behaviour through the public facade.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ridgeline_analytics::client::{retry_async, BackoffStrategy};
use ridgeline_analytics::{ElementParser, ErrorKind, RetryConfig};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::common::{authorized_client, reports_page, Report};

/// Mount a paginated `reports` endpoint holding `total` reports.
async fn mount_reports(server: &MockServer, total: usize) {
    Mock::given(method("GET"))
        .and(path("/api/reports"))
        .respond_with(move |request: &Request| {
            let param = |key: &str| {
                request
                    .url
                    .query_pairs()
                    .find(|(k, _)| k == key)
                    .and_then(|(_, v)| v.parse::<usize>().ok())
            };
            let offset = param("offset").unwrap_or(0);
            let size = param("size").unwrap_or(total);
            let count = total.saturating_sub(offset).min(size);
            ResponseTemplate::new(200).set_body_json(reports_page(offset, size, count))
        })
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_walk_all_pages() {
    let server = MockServer::start().await;
    mount_reports(&server, 5).await;

    let client = authorized_client(&server);
    let mut reports =
        client.new_paginated::<Report>("reports", "reports", ElementParser::deserialize());

    reports.load_size(2).await.unwrap();
    while reports.has_next_page() {
        reports.load_next().await.unwrap();
    }

    assert_eq!(reports.len(), 5);
    assert_eq!(reports.first_loaded_index(), Some(0));
    assert_eq!(reports.last_loaded_index(), Some(4));
    assert_eq!(reports.index_of_id("r3"), Some(3));
    assert_eq!(reports.get(4).unwrap().name, "Report 4");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_exactly_full_last_page_needs_one_empty_fetch() {
    let server = MockServer::start().await;
    mount_reports(&server, 4).await;

    let client = authorized_client(&server);
    let mut reports =
        client.new_paginated::<Report>("reports", "reports", ElementParser::deserialize());

    reports.load_size(2).await.unwrap();
    reports.load_next().await.unwrap();
    assert!(reports.has_next_page());

    reports.load_next().await.unwrap();
    assert!(!reports.has_next_page());
    assert_eq!(reports.len(), 4);
    assert_eq!(reports.page(), Some(2));

    reports.load_next().await.unwrap();
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_window_in_the_middle() {
    let server = MockServer::start().await;
    mount_reports(&server, 20).await;

    let client = authorized_client(&server);
    let mut reports =
        client.new_paginated::<Report>("reports", "reports", ElementParser::deserialize());

    reports.load_page(3, 4).await.unwrap();
    assert_eq!(reports.first_loaded_index(), Some(12));
    assert!(reports.get(11).is_err());
    assert_eq!(reports.get(12).unwrap().id, "r12");

    reports.load_next().await.unwrap();
    assert_eq!(reports.last_loaded_index(), Some(19));
    assert_eq!(reports.first_page(), Some(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_collection_loads_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboards"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"dashboards": [{"id": "d1", "name": "Ops"}]}))
                .set_delay(Duration::from_millis(20)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = Arc::new(authorized_client(&server));
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let client = Arc::clone(&client);
        tasks.push(tokio::spawn(async move {
            let dashboards = client
                .cached::<Report>("dashboards", "dashboards", "dashboards", ElementParser::deserialize())
                .unwrap();
            let mut dashboards = dashboards.lock().await;
            dashboards.load_first_time().await.unwrap();
            dashboards.len()
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap(), 1);
    }
}

#[tokio::test]
async fn test_caller_layered_retry() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    Mock::given(method("GET"))
        .and(path("/api/dashboards"))
        .respond_with(move |_: &Request| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(503)
            } else {
                ResponseTemplate::new(200).set_body_json(json!({"dashboards": []}))
            }
        })
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    let dashboards = client
        .cached::<Report>("dashboards", "dashboards", "dashboards", ElementParser::deserialize())
        .unwrap();

    let config = RetryConfig::default()
        .with_max_attempts(2)
        .with_initial_delay(Duration::from_millis(5))
        .with_backoff(BackoffStrategy::Constant);

    let shared = &dashboards;
    retry_async(&config, move || async move { shared.lock().await.load().await })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(dashboards.lock().await.is_loaded());
}

#[tokio::test]
async fn test_executor_does_not_retry_on_its_own() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    let mut reports =
        client.new_paginated::<Report>("reports", "reports", ElementParser::deserialize());
    let err = reports.load().await.unwrap_err();

    assert!(matches!(err.kind, ErrorKind::InternalServer));
    assert!(err.is_retryable());
}
