//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end with the HTTP render backend.

use sitecrawl::config::{Config, DocumentNaming};
use sitecrawl::crawler::DocumentLink;
use sitecrawl::{crawl, CancelToken, CrawlError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into the given directory
fn create_test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.delay_seconds = 0.0;
    config.crawler.timeout_ms = 5_000;
    config.crawler.document_timeout_ms = 5_000;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.site_root = dir.join("site");
    config.output.artifact_root = dir.join("files");
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Mirror directory for the mock server's authority
fn site_dir(dir: &Path, server: &MockServer) -> PathBuf {
    let authority = server.uri().trim_start_matches("http://").to_string();
    dir.join("site").join(authority)
}

#[tokio::test]
async fn test_crawl_stays_within_seed_authority() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    mount_page(
        &server,
        "/",
        &format!(
            r#"<p>Welcome</p>
            <a href="/about">About</a>
            <a href="{}/elsewhere">Elsewhere</a>"#,
            other.uri()
        ),
    )
    .await;
    mount_page(&server, "/about", "<p>About us</p>").await;

    Mock::given(method("GET"))
        .respond_with(html("<p>should not be fetched</p>"))
        .expect(0)
        .mount(&other)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let report = crawl(&format!("{}/", server.uri()), &config, CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.pages_failed, 0);

    let site = site_dir(dir.path(), &server);
    assert_eq!(
        std::fs::read_to_string(site.join("index.txt")).unwrap(),
        "Welcome\nAbout\nElsewhere"
    );
    assert!(site.join("about.txt").exists());
    assert!(site.join("about_document_links.json").exists());
}

#[tokio::test]
async fn test_document_downloaded_once_and_skipped_on_recrawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<p>Reports</p><a href="/files/report.pdf">Annual Report</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 annual".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let seed = format!("{}/", server.uri());

    let first = crawl(&seed, &config, CancelToken::new()).await.unwrap();
    assert_eq!(first.documents_saved, 1);
    assert_eq!(first.pages_visited, 1);

    let saved = dir.path().join("files/pdf/Annual Report.pdf");
    assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-1.4 annual");

    let sidecar = site_dir(dir.path(), &server).join("index_document_links.json");
    let links: Vec<DocumentLink> =
        serde_json::from_str(&std::fs::read_to_string(&sidecar).unwrap()).unwrap();
    assert_eq!(
        links,
        vec![DocumentLink {
            text: "Annual Report".to_string(),
            url: format!("{}/files/report.pdf", server.uri()),
            file_type: "pdf".to_string(),
        }]
    );

    let second = crawl(&seed, &config, CancelToken::new()).await.unwrap();
    assert_eq!(second.documents_saved, 0);
    assert_eq!(second.documents_skipped, 1);
}

#[tokio::test]
async fn test_missing_robots_allows_everything() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/", r#"<p>Home</p><a href="/a">A</a>"#).await;
    mount_page(&server, "/a", "<p>A</p>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let report = crawl(&format!("{}/", server.uri()), &config, CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.pages_rejected, 0);
}

#[tokio::test]
async fn test_robots_disallow_respected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private/\n"),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        r#"<p>Home</p><a href="/private/secret">Secret</a><a href="/public">Public</a>"#,
    )
    .await;
    mount_page(&server, "/public", "<p>Public</p>").await;
    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html("<p>Secret</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let report = crawl(&format!("{}/", server.uri()), &config, CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.pages_visited, 2);
    assert!(!site_dir(dir.path(), &server).join("private").exists());
}

#[tokio::test]
async fn test_timed_out_page_does_not_stop_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<p>Home</p><a href="/slow">Slow</a><a href="/y">Y</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>late</p>").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    mount_page(&server, "/y", "<p>Y</p>").await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.crawler.timeout_ms = 300;
    let report = crawl(&format!("{}/", server.uri()), &config, CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.pages_timed_out, 1);
    assert_eq!(report.pages_visited, 2);

    let site = site_dir(dir.path(), &server);
    assert!(!site.join("slow.txt").exists());
    assert!(site.join("y.txt").exists());
}

#[tokio::test]
async fn test_colliding_document_names_keep_first() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/a.pdf">Q1 Report!</a><a href="/b.pdf">Q1 Report?</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"first".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"second".to_vec(), "application/pdf"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let report = crawl(&format!("{}/", server.uri()), &config, CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.documents_saved, 1);
    assert_eq!(report.documents_skipped, 1);
    assert_eq!(
        std::fs::read(dir.path().join("files/pdf/Q1 Report.pdf")).unwrap(),
        b"first"
    );
}

#[tokio::test]
async fn test_hash_naming_keeps_both_documents() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/a.pdf">Q1 Report!</a><a href="/b.pdf">Q1 Report?</a>"#,
    )
    .await;
    for (doc, body) in [("/a.pdf", "first"), ("/b.pdf", "second")] {
        Mock::given(method("GET"))
            .and(path(doc))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/pdf"))
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.output.document_naming = DocumentNaming::DisplayTextWithHash;
    let report = crawl(&format!("{}/", server.uri()), &config, CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.documents_saved, 2);
    assert_eq!(std::fs::read_dir(dir.path().join("files/pdf")).unwrap().count(), 2);
}

#[tokio::test]
async fn test_each_page_fetched_once() {
    let server = MockServer::start().await;

    for (page, body) in [
        ("/", r#"<a href="/a">A</a><a href="/b">B</a><a href="/#top">Top</a>"#),
        ("/a", r#"<a href="/">Home</a><a href="/b">B</a><a href="/a#again">A</a>"#),
        ("/b", r#"<a href="/a">A</a><a href="/">Home</a>"#),
    ] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let report = crawl(&format!("{}/", server.uri()), &config, CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.pages_visited + report.pages_failed, 3);
}

#[tokio::test]
async fn test_recrawl_produces_identical_mirror() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<p>Home</p><a href="/docs/guide">Guide</a><a href="https://x.test/f.xlsx">Sheet</a>"#,
    )
    .await;
    mount_page(&server, "/docs/guide", "<h1>Guide</h1><p>Step one</p>").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    // keep the external document out of the artifact store
    config.crawler.document_extensions = vec!["pdf".to_string()];
    let seed = format!("{}/", server.uri());

    crawl(&seed, &config, CancelToken::new()).await.unwrap();
    let site = site_dir(dir.path(), &server);
    let first_index = std::fs::read(site.join("index.txt")).unwrap();
    let first_guide = std::fs::read(site.join("docs/guide.txt")).unwrap();

    crawl(&seed, &config, CancelToken::new()).await.unwrap();
    assert_eq!(std::fs::read(site.join("index.txt")).unwrap(), first_index);
    assert_eq!(std::fs::read(site.join("docs/guide.txt")).unwrap(), first_guide);
    assert_eq!(
        std::fs::read_to_string(site.join("docs/guide_document_links.json")).unwrap(),
        "[]\n"
    );
}

#[tokio::test]
async fn test_expired_deadline_stops_before_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>Home</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let cancel = CancelToken::new().with_deadline(Duration::ZERO);
    let report = crawl(&format!("{}/", server.uri()), &config, cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.pages_visited, 0);
    assert_eq!(report.frontier_remaining, 1);
}

#[tokio::test]
async fn test_invalid_seed_rejected() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    let result = crawl("ftp://example.com/", &config, CancelToken::new()).await;
    assert!(matches!(result, Err(CrawlError::UrlError(_))));
}
