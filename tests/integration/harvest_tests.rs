use crate::{arrival_gaps, create_test_config, file_names, ArrivalRecorder};
use media_harvester::crawler::{harvest, CancelToken};
use media_harvester::output::write_markdown_report;
use media_harvester::{Coordinator, DownloadStatus, HarvestError, ResourceKind, SkipReason};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, page: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_bytes(server: &MockServer, resource: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(resource))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_harvest_saves_images_in_document_order() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/gallery/index.html",
        r#"<html><body>
            <img src="pics/a.png">
            <img src="/root.jpg">
            <p>text</p>
        </body></html>"#,
    )
    .await;
    mount_bytes(&server, "/gallery/pics/a.png", b"relative").await;
    mount_bytes(&server, "/root.jpg", b"rooted").await;

    let config = create_test_config(&server, "/gallery/index.html", &dir, ResourceKind::Image, 6000);
    let report = harvest(&config).await.unwrap();

    assert_eq!(
        report.statuses(),
        vec![DownloadStatus::Saved, DownloadStatus::Saved]
    );
    assert!(!report.cancelled);
    assert_eq!(file_names(&dir), vec!["a.png", "root.jpg"]);
    assert_eq!(std::fs::read(dir.path().join("a.png")).unwrap(), b"relative");
    assert_eq!(std::fs::read(dir.path().join("root.jpg")).unwrap(), b"rooted");
}

#[tokio::test]
async fn test_harvest_sends_user_agent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "HarvestTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<img src="x.png">"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x.png"))
        .and(header("user-agent", "HarvestTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, "/", &dir, ResourceKind::Image, 6000);
    let report = harvest(&config).await.unwrap();

    assert_eq!(report.saved(), 1);
}

#[tokio::test]
async fn test_per_item_failure_is_isolated() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<img src="ok1.png"><img src="http://[::1"><img src="ok2.png">"#,
    )
    .await;
    mount_bytes(&server, "/ok1.png", b"1").await;
    mount_bytes(&server, "/ok2.png", b"2").await;

    let config = create_test_config(&server, "/", &dir, ResourceKind::Image, 6000);
    let report = harvest(&config).await.unwrap();

    assert_eq!(
        report.statuses(),
        vec![
            DownloadStatus::Saved,
            DownloadStatus::SkippedError,
            DownloadStatus::Saved
        ]
    );
    assert!(matches!(
        report.outcomes[1].reason,
        Some(SkipReason::InvalidUrl(_))
    ));
    assert!(report.outcomes[1].resource.is_none());
    assert_eq!(file_names(&dir), vec!["ok1.png", "ok2.png"]);
}

#[tokio::test]
async fn test_non_success_resources_are_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<img src="missing.png"><img src="broken.png"><img src="fine.png">"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.png"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_bytes(&server, "/fine.png", b"ok").await;

    let config = create_test_config(&server, "/", &dir, ResourceKind::Image, 6000);
    let report = harvest(&config).await.unwrap();

    assert_eq!(
        report.statuses(),
        vec![
            DownloadStatus::SkippedNonSuccess,
            DownloadStatus::SkippedNonSuccess,
            DownloadStatus::Saved
        ]
    );
    assert_eq!(report.outcomes[0].reason, Some(SkipReason::HttpStatus(404)));
    assert_eq!(report.outcomes[1].reason, Some(SkipReason::HttpStatus(500)));
    assert_eq!(file_names(&dir), vec!["fine.png"]);
}

#[tokio::test]
async fn test_transport_error_resource_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let html = format!(
        r#"<img src="http://127.0.0.1:{}/gone.png"><img src="here.png">"#,
        port
    );
    mount_page(&server, "/", &html).await;
    mount_bytes(&server, "/here.png", b"here").await;

    let config = create_test_config(&server, "/", &dir, ResourceKind::Image, 6000);
    let report = harvest(&config).await.unwrap();

    assert_eq!(
        report.statuses(),
        vec![DownloadStatus::SkippedError, DownloadStatus::Saved]
    );
    assert!(matches!(
        report.outcomes[0].reason,
        Some(SkipReason::Transport(_))
    ));
}

#[tokio::test]
async fn test_page_fetch_failure_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    // No resource may be requested after the page fails
    Mock::given(method("GET"))
        .and(path("/cat.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, "/", &dir, ResourceKind::Image, 6000);
    let result = harvest(&config).await;

    assert!(matches!(
        result,
        Err(HarvestError::PageFetch {
            status_code: 404,
            ..
        })
    ));
    assert!(file_names(&dir).is_empty());
}

#[tokio::test]
async fn test_duplicate_names_never_overwrite() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<img src="/a/cat.png"><img src="/b/cat.png">"#,
    )
    .await;
    mount_bytes(&server, "/a/cat.png", b"first").await;
    mount_bytes(&server, "/b/cat.png", b"second").await;

    let config = create_test_config(&server, "/", &dir, ResourceKind::Image, 6000);
    let report = harvest(&config).await.unwrap();

    assert_eq!(report.saved(), 2);
    assert_eq!(file_names(&dir), vec!["cat.png", "cat_(1).png"]);
    assert_eq!(std::fs::read(dir.path().join("cat.png")).unwrap(), b"first");
    assert_eq!(std::fs::read(dir.path().join("cat_(1).png")).unwrap(), b"second");

    // A second run continues the sequence instead of replacing files
    let server_again = MockServer::start().await;
    mount_page(&server_again, "/", r#"<img src="/cat.png">"#).await;
    mount_bytes(&server_again, "/cat.png", b"third").await;

    let config = create_test_config(&server_again, "/", &dir, ResourceKind::Image, 6000);
    harvest(&config).await.unwrap();

    assert_eq!(file_names(&dir), vec!["cat.png", "cat_(1).png", "cat_(2).png"]);
    assert_eq!(std::fs::read(dir.path().join("cat.png")).unwrap(), b"first");
}

#[tokio::test]
async fn test_kind_selects_only_matching_tags() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<img src="picture.png"><audio src="song.mp3"></audio><video src="clip.mp4"></video>"#,
    )
    .await;
    mount_bytes(&server, "/song.mp3", b"la").await;
    Mock::given(method("GET"))
        .and(path("/picture.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/clip.mp4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, "/", &dir, ResourceKind::Audio, 6000);
    let report = harvest(&config).await.unwrap();

    assert_eq!(report.statuses(), vec![DownloadStatus::Saved]);
    assert_eq!(file_names(&dir), vec!["song.mp3"]);
}

#[tokio::test]
async fn test_rate_ceiling_is_respected() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<img src="1.png"><img src="2.png"><img src="3.png">"#,
    )
    .await;
    for name in ["/1.png", "/2.png", "/3.png"] {
        mount_bytes(&server, name, b"x").await;
    }

    // 600 per minute: one request every 100ms, four requests in total
    let config = create_test_config(&server, "/", &dir, ResourceKind::Image, 600);
    let start = Instant::now();
    let report = harvest(&config).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.saved(), 3);
    assert!(
        elapsed >= Duration::from_millis(300),
        "four requests finished in {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_every_request_gap_respects_interval() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ArrivalRecorder::new(
            &arrivals,
            ResponseTemplate::new(200).set_body_string(
                r#"<img src="1.png"><img src="missing.png"><img src="3.png">"#,
            ),
        ))
        .mount(&server)
        .await;
    for name in ["/1.png", "/3.png"] {
        Mock::given(method("GET"))
            .and(path(name))
            .respond_with(ArrivalRecorder::new(
                &arrivals,
                ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()),
            ))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ArrivalRecorder::new(&arrivals, ResponseTemplate::new(404)))
        .mount(&server)
        .await;

    // 600 per minute: at least 100ms between any two requests
    let config = create_test_config(&server, "/", &dir, ResourceKind::Image, 600);
    harvest(&config).await.unwrap();

    let gaps = arrival_gaps(&arrivals);
    assert_eq!(gaps.len(), 3);
    for gap in gaps {
        assert!(
            gap >= Duration::from_millis(80),
            "requests only {:?} apart",
            gap
        );
    }
}

#[tokio::test]
async fn test_cancel_before_start_processes_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, "/", &dir, ResourceKind::Image, 6000);
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut coordinator = Coordinator::from_config(&config)
        .unwrap()
        .with_cancel_token(cancel);
    let result = coordinator.run().await;

    assert!(matches!(result, Err(HarvestError::Cancelled)));
    assert!(file_names(&dir).is_empty());
}

#[tokio::test]
async fn test_cancel_during_run_stops_remaining_resources() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<img src="1.png"><img src="2.png"><img src="3.png">"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/1.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    // 60 per minute: the first resource waits a full second after the page
    let config = create_test_config(&server, "/", &dir, ResourceKind::Image, 60);
    let mut coordinator = Coordinator::from_config(&config).unwrap();
    let cancel = coordinator.cancel_token();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        cancel.cancel();
    });

    let report = coordinator.run().await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.total(), 1);
    assert_eq!(report.outcomes[0].reason, Some(SkipReason::Cancelled));
    assert!(file_names(&dir).is_empty());
}

#[tokio::test]
async fn test_report_written_after_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let report_dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<video src="clip.mp4"></video>"#).await;
    mount_bytes(&server, "/clip.mp4", b"frames").await;

    let config = create_test_config(&server, "/", &dir, ResourceKind::Video, 6000);
    let report = harvest(&config).await.unwrap();

    let report_path = report_dir.path().join("report.md");
    write_markdown_report(&report, &report_path).unwrap();

    let markdown = std::fs::read_to_string(&report_path).unwrap();
    assert!(markdown.contains("- **Kind**: video"));
    assert!(markdown.contains("| Saved | 1 |"));
    assert!(markdown.contains("clip.mp4"));
}
