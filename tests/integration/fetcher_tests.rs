//! Integration tests for the HTTP fetcher

use appstore_harvest::config::UserAgentConfig;
use appstore_harvest::crawler::{FetchError, HttpFetcher, PageFetcher};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(timeout: Duration) -> HttpFetcher {
    let config = UserAgentConfig {
        identity: "Mozilla/5.0 (HarvestTest)".to_string(),
    };
    HttpFetcher::new(&config, timeout).unwrap()
}

#[tokio::test]
async fn test_sends_configured_identity() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/us/app/x/id1"))
        .and(header("user-agent", "Mozilla/5.0 (HarvestTest)"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>ok</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/us/app/x/id1?mt=8", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "<h1>ok</h1>");
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/us/genre/id6014?letter=A&page=1", server.uri());
    let err = fetcher(Duration::from_secs(5)).fetch(&url).await.unwrap_err();

    match err {
        FetchError::Status { url: failed, status } => {
            assert_eq!(status, 500);
            assert_eq!(failed, url);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = fetcher(Duration::from_millis(200))
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_follows_redirects() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri()).as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;

    let body = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/old", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "moved");
}
