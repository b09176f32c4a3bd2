use crate::{arrival_gaps, create_test_config, file_names, ArrivalRecorder};
use media_harvester::crawler::harvest;
use media_harvester::{DownloadStatus, ResourceKind};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_gallery(server: &MockServer, names: &[&str]) {
    let html: String = names
        .iter()
        .map(|name| format!(r#"<img src="/{}">"#, name))
        .collect();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .expect(1)
        .mount(server)
        .await;

    for name in names {
        Mock::given(method("GET"))
            .and(path(format!("/{}", name)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(name.as_bytes().to_vec())
                    .set_delay(Duration::from_millis(30)),
            )
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_pool_keeps_document_order() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let names = ["a.png", "b.png", "c.png", "d.png", "e.png", "f.png"];
    mount_gallery(&server, &names).await;

    let mut config = create_test_config(&server, "/", &dir, ResourceKind::Image, 6000);
    config.download.max_concurrent_downloads = 3;

    let report = harvest(&config).await.unwrap();

    let indices: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    assert!(report
        .statuses()
        .iter()
        .all(|s| *s == DownloadStatus::Saved));

    for (outcome, name) in report.outcomes.iter().zip(names) {
        assert_eq!(outcome.saved_path.as_ref().unwrap(), &dir.path().join(name));
    }
}

#[tokio::test]
async fn test_pool_produces_unique_names() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let html = r#"<img src="/x/cat.png">"#.repeat(8);
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x/cat.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"cat".to_vec()))
        .expect(8)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, "/", &dir, ResourceKind::Image, 6000);
    config.download.max_concurrent_downloads = 4;

    let report = harvest(&config).await.unwrap();

    assert_eq!(report.saved(), 8);
    let paths: HashSet<_> = report.saved_paths().into_iter().collect();
    assert_eq!(paths.len(), 8);

    let names = file_names(&dir);
    assert_eq!(names.len(), 8);
    assert!(names.contains(&"cat.png".to_string()));
    for n in 1..=7 {
        assert!(names.contains(&format!("cat_({}).png", n)));
    }
}

#[tokio::test]
async fn test_pool_respects_rate_ceiling() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let names = ["1.png", "2.png", "3.png", "4.png", "5.png", "6.png"];
    mount_gallery(&server, &names).await;

    // 1200 per minute: one request every 50ms, seven requests in total
    let mut config = create_test_config(&server, "/", &dir, ResourceKind::Image, 1200);
    config.download.max_concurrent_downloads = 6;

    let start = Instant::now();
    let report = harvest(&config).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.saved(), 6);
    assert!(
        elapsed >= Duration::from_millis(300),
        "seven requests finished in {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_pool_spaces_every_request() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    let html = r#"<img src="/a.png"><img src="/b.png"><img src="/c.png"><img src="/d.png">"#;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ArrivalRecorder::new(
            &arrivals,
            ResponseTemplate::new(200).set_body_string(html),
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/[a-d]\.png$"))
        .respond_with(ArrivalRecorder::new(
            &arrivals,
            ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()),
        ))
        .expect(4)
        .mount(&server)
        .await;

    // Four workers, 600 per minute: still at least 100ms between any two requests
    let mut config = create_test_config(&server, "/", &dir, ResourceKind::Image, 600);
    config.download.max_concurrent_downloads = 4;

    let report = harvest(&config).await.unwrap();
    assert_eq!(report.saved(), 4);

    let gaps = arrival_gaps(&arrivals);
    assert_eq!(gaps.len(), 4);
    for gap in gaps {
        assert!(
            gap >= Duration::from_millis(80),
            "requests only {:?} apart",
            gap
        );
    }
}
