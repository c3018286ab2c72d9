//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run whole
//! crawls through the `CrawlManager`.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::time::Duration;
use sumi_audit::{AuditError, CrawlManager, CrawlOptions, CrawlState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Options that keep the tests fast
fn test_options(max_pages: u32) -> CrawlOptions {
    CrawlOptions {
        max_depth: max_pages,
        request_delay: 10,
        request_timeout: 2000,
        ..CrawlOptions::default()
    }
}

/// A page that triggers none of the SEO rules
fn clean_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>{title}</title>
  <meta name="description" content="About {title}">
  <meta name="keywords" content="test">
  <meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body>
  <h1>{title}</h1>
  {body}
</body>
</html>"#
    )
}

async fn mount_html(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Extracts every `<loc>` of a sitemap
fn sitemap_locs(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut locs = Vec::new();
    let mut in_loc = false;

    loop {
        match reader.read_event().expect("sitemap is well-formed") {
            Event::Start(e) if e.name().as_ref() == b"loc" => in_loc = true,
            Event::End(e) if e.name().as_ref() == b"loc" => in_loc = false,
            Event::Text(t) if in_loc => locs.push(t.unescape().unwrap().into_owned()),
            Event::Eof => break,
            _ => {}
        }
    }
    locs
}

async fn crawl(seed: &str, options: CrawlOptions) -> (CrawlManager, CrawlState) {
    let manager = CrawlManager::new();
    let id = manager.start_crawl(seed, options).expect("seed is valid");
    let state = manager
        .wait_for_completion(&id)
        .await
        .expect("crawl finishes");
    (manager, state)
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        200,
        clean_page(
            "Home",
            r#"<a href="/a">A</a>
               <a href="/b">B</a>
               <a href="/c">C</a>
               <a href="https://other.example/page">Elsewhere</a>"#,
        ),
    )
    .await;
    for route in ["/a", "/b", "/c"] {
        mount_html(&server, route, 200, clean_page(route, r#"<a href="/">Home</a>"#)).await;
    }

    let (manager, state) = crawl(&base, test_options(10)).await;

    let urls: Vec<&str> = state.pages().iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/", base),
            format!("{}/a", base),
            format!("{}/b", base),
            format!("{}/c", base),
        ]
    );
    assert_eq!(state.domain, "127.0.0.1");

    let home = state.page(&format!("{}/", base)).unwrap();
    assert_eq!(home.links.internal.len(), 3);
    assert_eq!(home.links.external, vec!["https://other.example/page"]);
    assert!(home.issues.is_empty());

    let status = manager.get_crawl_status(&state.id).unwrap();
    assert!(status.completed);
    assert_eq!(status.page_count, 4);
    assert_eq!(status.total_pages, 4);
    assert!(status.current_url.is_none());

    assert_eq!(state.score, Some(100));
    assert!(state.end_time.is_some());
    assert!(!state.cancelled);

    let locs = sitemap_locs(state.sitemap.as_deref().unwrap());
    assert_eq!(locs, urls);
}

#[tokio::test]
async fn test_page_cap_limits_recorded_pages() {
    let server = MockServer::start().await;
    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{i}">{i}</a>"#))
        .collect();
    mount_html(&server, "/", 200, clean_page("Home", &links)).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(clean_page("Leaf", "")))
        .mount(&server)
        .await;

    let (_manager, state) = crawl(&server.uri(), test_options(3)).await;

    assert_eq!(state.page_count(), 3);
    assert_eq!(state.queue_len(), 8);
    assert_eq!(sitemap_locs(state.sitemap.as_deref().unwrap()).len(), 3);
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let server = MockServer::start().await;

    for (route, links) in [
        ("/", r#"<a href="/a">A</a><a href="/b">B</a><a href="/a#top">A again</a>"#),
        ("/a", r#"<a href="/b">B</a><a href="/">Home</a>"#),
        ("/b", r#"<a href="/a">A</a><a href="/?utm_source=newsletter">Home</a>"#),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(clean_page(route, links)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let (_manager, state) = crawl(&server.uri(), test_options(10)).await;

    assert_eq!(state.page_count(), 3);
    assert_eq!(state.visited_count(), 3);
}

#[tokio::test]
async fn test_error_page_reported_as_critical() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        200,
        clean_page("Home", r#"<a href="/missing">Gone</a>"#),
    )
    .await;
    mount_html(&server, "/missing", 404, String::new()).await;

    let (_manager, state) = crawl(&server.uri(), test_options(10)).await;

    let missing = state.page(&format!("{}/missing", server.uri())).unwrap();
    assert_eq!(missing.status_code, 404);
    assert_eq!(
        missing.issues.critical,
        vec![
            "Page returns HTTP error status 404",
            "Missing page title",
            "Missing meta description",
            "Missing H1 heading",
        ]
    );
    assert_eq!(state.issue_totals.critical, 4);
    // 100 - 4/2*50
    assert_eq!(state.score, Some(0));
}

#[tokio::test]
async fn test_unreachable_page_does_not_stop_crawl() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        200,
        clean_page("Home", r#"<a href="/slow">Slow</a><a href="/fine">Fine</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(clean_page("Slow", ""))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    mount_html(&server, "/fine", 200, clean_page("Fine", "")).await;

    let options = CrawlOptions {
        request_timeout: 500,
        ..test_options(10)
    };
    let (_manager, state) = crawl(&server.uri(), options).await;

    assert_eq!(state.page_count(), 3);

    let slow_url = format!("{}/slow", server.uri());
    let slow = state.page(&slow_url).unwrap();
    assert!(slow.is_unreachable());
    assert_eq!(slow.links.broken, vec![slow_url.clone()]);
    assert_eq!(slow.issues.critical, vec!["Page could not be accessed"]);

    let fine = state.page(&format!("{}/fine", server.uri())).unwrap();
    assert_eq!(fine.status_code, 200);
    assert!(fine.issues.is_empty());
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let manager = CrawlManager::new();

    let result = manager.start_crawl("http://", test_options(10));
    assert!(matches!(result, Err(AuditError::InvalidSeed { .. })));

    let result = manager.start_crawl("ftp://example.com/", test_options(10));
    assert!(matches!(result, Err(AuditError::InvalidSeed { .. })));
}

#[tokio::test]
async fn test_completion_is_observed_once() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        200,
        clean_page("Home", r#"<a href="/a">A</a>"#),
    )
    .await;
    mount_html(&server, "/a", 200, clean_page("A", "")).await;

    let manager = CrawlManager::new();
    let id = manager.start_crawl(&server.uri(), test_options(10)).unwrap();

    let running = manager.get_crawl_result(&id).unwrap();
    assert!(running.end_time.is_none());
    assert!(running.score.is_none());

    let mut seen_completed = false;
    for _ in 0..200 {
        let status = manager.get_crawl_status(&id).unwrap();
        if seen_completed {
            assert!(status.completed);
        }
        seen_completed = status.completed;
        if seen_completed {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(seen_completed);

    let first = manager.get_crawl_result(&id).unwrap();
    let second = manager.get_crawl_result(&id).unwrap();
    assert_eq!(first.end_time, second.end_time);
    assert_eq!(
        manager.get_crawl_status(&id),
        manager.get_crawl_status(&id)
    );
    assert_eq!(first.page_count(), 2);
}

#[tokio::test]
async fn test_cancel_stops_further_fetches() {
    let server = MockServer::start().await;
    let links: String = (0..5)
        .map(|i| format!(r#"<a href="/p{i}">{i}</a>"#))
        .collect();
    mount_html(&server, "/", 200, clean_page("Home", &links)).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(clean_page("Leaf", "")))
        .mount(&server)
        .await;

    let manager = CrawlManager::new();
    let options = CrawlOptions {
        request_delay: 1000,
        ..test_options(10)
    };
    let id = manager.start_crawl(&server.uri(), options).unwrap();

    // Let the seed page be recorded, then cancel during the delay
    for _ in 0..200 {
        if manager.get_crawl_status(&id).unwrap().page_count > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(manager.cancel_crawl(&id));

    let state = tokio::time::timeout(Duration::from_secs(10), manager.wait_for_completion(&id))
        .await
        .expect("cancelled crawl finishes after the current delay")
        .unwrap();

    assert!(state.cancelled);
    assert_eq!(state.page_count(), 1);
    assert_eq!(state.queue_len(), 5);
    assert_eq!(state.score, Some(100));
    assert_eq!(sitemap_locs(state.sitemap.as_deref().unwrap()).len(), 1);
}

#[tokio::test]
async fn test_disabled_checks() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        200,
        clean_page("Home", r#"<img src="/a.png"><img src="/b.png" alt="B">"#),
    )
    .await;

    let options = CrawlOptions {
        check_images: false,
        check_performance: false,
        ..test_options(10)
    };
    let (_manager, state) = crawl(&server.uri(), options).await;

    let page = &state.pages()[0];
    assert_eq!(page.images.total, 0);
    assert!(page.performance.load_time.is_none());
    assert!(page.performance.size > 0);
    assert_eq!(page.performance.resource_count, 2);
    assert!(page.issues.is_empty());
}

#[tokio::test]
async fn test_outputs_written_to_disk() {
    let server = MockServer::start().await;
    mount_html(&server, "/", 200, clean_page("Home & Garden", "")).await;

    let (manager, state) = crawl(&server.uri(), test_options(10)).await;

    let dir = tempfile::tempdir().unwrap();
    let sitemap_path = dir.path().join("sitemap.xml");
    let export_path = dir.path().join("crawl.json");
    manager.download_sitemap(&state.id, &sitemap_path).unwrap();
    manager.export_crawl_data(&state.id, &export_path).unwrap();

    let sitemap = std::fs::read_to_string(&sitemap_path).unwrap();
    assert_eq!(sitemap_locs(&sitemap), vec![format!("{}/", server.uri())]);

    let export: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export_path).unwrap()).unwrap();
    let page = &export["pages"][format!("{}/", server.uri())];
    assert_eq!(page["title"], "Home & Garden");
    assert_eq!(page["statusCode"], 200);
    assert_eq!(export["score"], 100);
}
