use std::sync::Arc;

use imgdrop_api_client::ApiClient;
use imgdrop_core::{DegradeReason, IngestConfig, JobStatus, ListingOrder};

const LISTING: &str = r#"[
    {
        "id": "9b2f0f4e-1d0c-4c5e-9a53-0d6f3f1b7a10",
        "job_id": "job-3",
        "image": null,
        "status": "processing",
        "name": "c.webp",
        "size": 3000,
        "type": "image/webp",
        "upload_time": null,
        "uploaded_at": "2024-03-01T10:00:03Z",
        "finished_at": null
    },
    {
        "id": "0c1a3b4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d",
        "job_id": "job-2",
        "image": "/media/images/b.png",
        "status": "completed",
        "name": "b.png",
        "size": 2000,
        "type": "image/png",
        "upload_time": "1.4 seconds",
        "uploaded_at": "2024-03-01T10:00:02Z",
        "finished_at": "2024-03-01T10:00:03.4Z"
    },
    {
        "id": "7d8e9f0a-1b2c-4d3e-8f4a-5b6c7d8e9f0a",
        "job_id": null,
        "image": null,
        "status": "error",
        "name": "a.jpg",
        "size": 1000,
        "type": "image/jpeg",
        "upload_time": null,
        "uploaded_at": "2024-03-01T10:00:01",
        "finished_at": null
    }
]"#;

fn client_for(base_url: &str) -> ApiClient {
    let config = IngestConfig::for_base_url(base_url);
    ApiClient::new(Arc::new(config)).unwrap()
}

async fn serve_listing(
    server: &mut mockito::ServerGuard,
    status: usize,
    body: &str,
) -> mockito::Mock {
    server
        .mock("GET", "/api/list")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn test_listing_keeps_backend_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = serve_listing(&mut server, 200, LISTING).await;

    let client = client_for(&server.url());
    let listing = client.fetch_listing(ListingOrder::BackendOrder).await;

    mock.assert_async().await;
    assert!(!listing.is_degraded());
    let names: Vec<&str> = listing.jobs().iter().map(|j| j.name.as_str()).collect();
    assert_eq!(names, vec!["c.webp", "b.png", "a.jpg"]);

    let completed = &listing.jobs()[1];
    assert_eq!(completed.status, JobStatus::Completed);
    assert!(completed.is_ready());
    assert_eq!(completed.image.as_deref(), Some("/media/images/b.png"));
    assert_eq!(
        completed.upload_time.as_ref().and_then(|t| t.as_seconds()),
        Some(1.4)
    );

    // Falls back to the primary key when job_id is null
    assert_eq!(
        listing.jobs()[2].key(),
        Some("7d8e9f0a-1b2c-4d3e-8f4a-5b6c7d8e9f0a")
    );
    assert!(listing.jobs()[2].uploaded_at.is_some());
}

#[tokio::test]
async fn test_reversed_listing_is_backend_order_reversed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/list")
        .with_status(200)
        .with_body(LISTING)
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let backend = client.list_jobs(ListingOrder::BackendOrder).await;
    let mut reversed = client.list_jobs(ListingOrder::Reversed).await;

    mock.assert_async().await;
    reversed.reverse();
    assert_eq!(reversed, backend);
}

#[tokio::test]
async fn test_repeated_fetches_are_identical() {
    let mut server = mockito::Server::new_async().await;
    let _mock = serve_listing(&mut server, 200, LISTING).await;

    let client = client_for(&server.url());
    let first = client.fetch_listing(ListingOrder::BackendOrder).await;
    let second = client.fetch_listing(ListingOrder::BackendOrder).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_server_error_degrades_to_empty() {
    let mut server = mockito::Server::new_async().await;
    let _mock = serve_listing(&mut server, 500, r#"{"detail": "database unavailable"}"#).await;

    let client = client_for(&server.url());
    let listing = client.fetch_listing(ListingOrder::BackendOrder).await;

    assert!(listing.is_empty());
    assert!(matches!(
        listing.degrade_reason(),
        Some(DegradeReason::Status { status: 500, .. })
    ));
    assert!(client.list_jobs(ListingOrder::Reversed).await.is_empty());
}

#[tokio::test]
async fn test_malformed_body_degrades_to_empty() {
    let mut server = mockito::Server::new_async().await;
    let _mock = serve_listing(&mut server, 200, r#"{"results": []}"#).await;

    let client = client_for(&server.url());
    let listing = client.fetch_listing(ListingOrder::BackendOrder).await;

    assert!(listing.is_empty());
    assert!(matches!(
        listing.degrade_reason(),
        Some(DegradeReason::Decode { .. })
    ));
}

#[tokio::test]
async fn test_unreachable_backend_degrades_to_empty() {
    let client = client_for("http://127.0.0.1:1");
    let listing = client.fetch_listing(ListingOrder::BackendOrder).await;

    assert!(listing.is_empty());
    assert!(matches!(
        listing.degrade_reason(),
        Some(DegradeReason::Transport { .. })
    ));
}

#[tokio::test]
async fn test_genuinely_empty_listing_is_not_degraded() {
    let mut server = mockito::Server::new_async().await;
    let _mock = serve_listing(&mut server, 200, "[]").await;

    let client = client_for(&server.url());
    let listing = client.fetch_listing(ListingOrder::BackendOrder).await;

    assert!(listing.is_empty());
    assert!(!listing.is_degraded());
}

#[tokio::test]
async fn test_presented_listing_prefixes_media_base() {
    let mut server = mockito::Server::new_async().await;
    let _mock = serve_listing(&mut server, 200, LISTING).await;

    let mut config = IngestConfig::for_base_url(&server.url());
    config.media_base_url = "https://cdn.example".to_string();
    let client = ApiClient::new(Arc::new(config)).unwrap();

    let listing = client.fetch_presented(ListingOrder::BackendOrder).await;
    assert_eq!(listing.jobs()[0].image, None);
    assert_eq!(
        listing.jobs()[1].image.as_deref(),
        Some("https://cdn.example/media/images/b.png")
    );
}
