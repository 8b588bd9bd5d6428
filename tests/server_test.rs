use chrono::{Duration, Local};
use httpmock::prelude::*;
use obit_feed::core::calendar::CalendarOptions;
use obit_feed::server::{self, AppState, RemoteFeed};
use obit_feed::{EtlEngine, HttpFetcher, IngestionPipeline, LocalStorage, TomlConfig};
use std::sync::Arc;
use tempfile::TempDir;

/// Starts the feed server on an ephemeral port and returns its base URL.
async fn spawn_server(listing_url: String, remote_feed: Option<RemoteFeed>) -> (String, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = TomlConfig::from_toml_str(&format!(
        r#"
[source]
listing_url = "{}"
retry_attempts = 0
timeout_seconds = 5
"#,
        listing_url
    ))
    .unwrap();

    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let pipeline = IngestionPipeline::new(storage, config).unwrap();
    let state = AppState::new(
        EtlEngine::new(pipeline),
        CalendarOptions::default(),
        remote_feed,
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, Arc::new(state)));

    (format!("http://{}", addr), temp_dir)
}

fn mock_site(server: &MockServer) -> chrono::NaiveDateTime {
    let service = (Local::now().naive_local() + Duration::days(2))
        .date()
        .and_hms_opt(11, 0, 0)
        .unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/listing");
        then.status(200).body(
            r#"<a href="/obituary/jane-doe">Jane Doe</a>
               <a href="/obituary/missing">Missing</a>"#,
        );
    });
    server.mock(|when, then| {
        when.method(GET).path("/obituary/jane-doe");
        then.status(200).body(format!(
            "<h1>Jane Doe</h1><p>Service {}</p>",
            service.format("%B %-d, %Y %-I:%M %p")
        ));
    });
    server.mock(|when, then| {
        when.method(GET).path("/obituary/missing");
        then.status(404);
    });

    service
}

#[tokio::test]
async fn test_obits_endpoint_returns_feed() {
    let upstream = MockServer::start();
    let service = mock_site(&upstream);
    let (base, _dir) = spawn_server(upstream.url("/listing"), None).await;

    let response = reqwest::get(format!("{}/api/obits", base)).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let feed: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        feed,
        serde_json::json!([{
            "name": "Jane Doe",
            "date": service.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "link": upstream.url("/obituary/jane-doe"),
        }])
    );
}

#[tokio::test]
async fn test_obits_endpoint_reports_listing_failure() {
    let upstream = MockServer::start();
    upstream.mock(|when, then| {
        when.method(GET).path("/listing");
        then.status(502);
    });
    let (base, _dir) = spawn_server(upstream.url("/listing"), None).await;

    let response = reqwest::get(format!("{}/api/obits", base)).await.unwrap();

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("502"));
}

#[tokio::test]
async fn test_calendar_endpoint_in_process() {
    let upstream = MockServer::start();
    let service = mock_site(&upstream);
    let (base, _dir) = spawn_server(upstream.url("/listing"), None).await;

    let response = reqwest::get(format!("{}/calendar.ics", base)).await.unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/calendar"));
    let ics = response.text().await.unwrap();
    assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(ics.contains("SUMMARY:Jane Doe\r\n"));
    assert!(ics.contains(&format!(
        "DTSTART;TZID=America/New_York:{}\r\n",
        service.format("%Y%m%dT%H%M%S")
    )));
}

#[tokio::test]
async fn test_calendar_endpoint_from_remote_feed() {
    let upstream = MockServer::start();
    let feed_mock = upstream.mock(|when, then| {
        when.method(GET).path("/api/obits");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"name": "Jane Doe", "date": "2026-01-20T11:00:00"},
                {"name": "Bad Date", "date": "tomorrow"},
                {"name": "Numeric Date", "date": 20260120},
                {"name": "John Roe", "date": "2026-01-21T14:30"}
            ]));
    });
    let listing_mock = upstream.mock(|when, then| {
        when.method(GET).path("/listing");
        then.status(200).body("<html></html>");
    });

    let fetcher = HttpFetcher::new("Mozilla/5.0", std::time::Duration::from_secs(5), 0).unwrap();
    let remote = RemoteFeed::new(upstream.url("/api/obits"), fetcher);
    let (base, _dir) = spawn_server(upstream.url("/listing"), Some(remote)).await;

    let ics = reqwest::get(format!("{}/calendar.ics", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    feed_mock.assert();
    listing_mock.assert_hits(0);
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
    assert!(ics.contains("DTSTART;TZID=America/New_York:20260120T110000\r\n"));
    assert!(ics.contains("DTEND;TZID=America/New_York:20260120T120000\r\n"));
    assert!(ics.contains("DTSTART;TZID=America/New_York:20260121T143000\r\n"));
    assert!(!ics.contains("Numeric Date"));
}

#[tokio::test]
async fn test_calendar_endpoint_reports_failure_as_text() {
    let upstream = MockServer::start();
    upstream.mock(|when, then| {
        when.method(GET).path("/listing");
        then.status(503);
    });
    let (base, _dir) = spawn_server(upstream.url("/listing"), None).await;

    let response = reqwest::get(format!("{}/calendar.ics", base)).await.unwrap();

    assert_eq!(response.status(), 500);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert!(response
        .text()
        .await
        .unwrap()
        .starts_with("Error generating calendar:"));
}

#[tokio::test]
async fn test_static_routes() {
    let upstream = MockServer::start();
    let (base, _dir) = spawn_server(upstream.url("/listing"), None).await;

    let home = reqwest::get(format!("{}/", base)).await.unwrap();
    assert_eq!(home.status(), 200);
    assert!(home.text().await.unwrap().contains("/calendar.ics"));

    let favicon = reqwest::get(format!("{}/favicon.ico", base)).await.unwrap();
    assert_eq!(favicon.status(), 204);

    let health: serde_json::Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
}
