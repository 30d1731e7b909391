mod common;

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use common::serve_http;
use radiocc::catalog::CatalogClient;
use radiocc::RadioccError;

fn range() -> (DateTime<Utc>, DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 2, 23, 59, 59).unwrap(),
    )
}

/// Client of a local catalog answering every request with `status` and `body`.
async fn client_answering(status: &'static str, body: &'static str) -> CatalogClient {
    let base = serve_http(1, move |_| (status, body)).await;
    CatalogClient::new(format!("{base}/{{event_type}}"), "tgo", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_error_status_gives_no_events() {
    let client = client_answering("503 Service Unavailable", "[]").await;
    let (start, end) = range();
    assert!(client.fetch_occultations(&start, &end).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_occultations_keeps_windows_inside_range() {
    let body = r#"[
        {"time_start": "2024-01-01T00:10:00Z", "time_end": "2024-01-01T00:20:00Z"},
        {"time_start": "2024-01-02T23:55:00Z", "time_end": "2024-01-03T00:05:00Z"},
        {"time_start": "2024-01-01T05:00:00Z", "time_end": "2024-01-01T04:00:00Z"}
    ]"#;
    let client = client_answering("200 OK", body).await;
    let (start, end) = range();

    let windows = client.fetch_occultations(&start, &end).await.unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(
        windows[0].ingress,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 10, 0).unwrap()
    );
}

#[tokio::test]
async fn test_null_body_gives_no_events() {
    let client = client_answering("200 OK", "null").await;
    let (start, end) = range();
    assert!(client.fetch_passes(&start, &end).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_undecodable_body_is_an_error() {
    let client = client_answering("200 OK", r#"{"error": "oops"}"#).await;
    let (start, end) = range();
    assert!(matches!(
        client.fetch_passes(&start, &end).await,
        Err(RadioccError::JsonError(_))
    ));
}
