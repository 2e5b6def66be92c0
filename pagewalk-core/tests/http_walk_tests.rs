// End-to-end walks against a mock HTTP server

use pagewalk_core::analysis::{ArchiveAnalyzer, GrammarAnalyzer};
use pagewalk_core::{Address, Capabilities, CrawlConfig, Node, Traversal, render};
use pagewalk_scanner::{HtmlExtractor, HttpFetcher};
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn mount_page(server: &MockServer, route: &str, body: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
        )
        .expect(hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_walk_tags_dead_links_and_fetches_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r##"<a href="/about">About</a>
            <a href="/missing">Gone</a>
            <a href="mailto:team@example.test">Mail</a>
            <a href="#top">Top</a>"##,
        1,
    )
    .await;
    mount_page(&server, "/about", r#"<a href="/">Home</a><a href="/missing">Gone</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let capabilities = Capabilities {
        broken_links: true,
        ..Default::default()
    };
    let config = CrawlConfig::new(3, "127.0.0.1").with_capabilities(capabilities);
    let seed = Address::new(format!("{}/", base));

    let outcome = Traversal::new(HttpFetcher::new().unwrap(), HtmlExtractor::new(), config)
        .traverse(std::slice::from_ref(&seed))
        .await;

    let lines = render(&outcome.graph, &Node::Root);
    assert_eq!(
        lines,
        vec![
            format!("|-- {}/", base),
            format!("  |-- {}/about", base),
            format!("    |-- {}/", base),
            format!("    |-- {}/missing-BROKEN", base),
            format!("  |-- {}/missing-BROKEN", base),
            "  |-- mailto:team@example.test".to_string(),
        ]
    );
    assert_eq!(outcome.summary.pages_fetched, 2);
    assert_eq!(outcome.summary.fetch_failures, 1);
    assert_eq!(outcome.graph.broken_count(), 2);
}

#[tokio::test]
async fn test_walk_runs_analyzers_on_fetched_pages() {
    let server = MockServer::start().await;
    let base = server.uri();
    let archive_dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<p>We went to the the store.</p><a href="/next">Next</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/next", "<p>All good here.</p>", 1).await;

    let capabilities = Capabilities {
        grammar: true,
        archive: true,
        ..Default::default()
    };
    let config = CrawlConfig::new(1, "127.0.0.1").with_capabilities(capabilities);
    let seed = Address::new(format!("{}/", base));

    let outcome = Traversal::new(HttpFetcher::new().unwrap(), HtmlExtractor::new(), config)
        .with_analyzer(Box::new(GrammarAnalyzer::new()))
        .with_analyzer(Box::new(ArchiveAnalyzer::new(archive_dir.path())))
        .traverse(&[seed])
        .await;

    // one grammar finding on the seed, one archive finding per page
    assert_eq!(outcome.summary.findings, 3);
    assert_eq!(outcome.summary.analyzer_failures, 0);
    assert_eq!(std::fs::read_dir(archive_dir.path()).unwrap().count(), 2);
}
