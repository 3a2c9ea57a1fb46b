//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock job boards and test the full
//! crawl cycle end-to-end: seeding, politeness, extraction, pagination,
//! deduplication and output.

use jobsweep::config::{Config, CrawlerConfig, OutputConfig, SearchConfig};
use jobsweep::output::{open_sinks, OutputResult, RecordSink};
use jobsweep::sites::{AdapterError, RestrictedSite, SiteAdapter};
use jobsweep::{Crawler, JobRecord, SiteState};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A board whose single seed URL points at the mock server
struct MockBoard {
    id: &'static str,
    seed: Url,
}

impl SiteAdapter for MockBoard {
    fn id(&self) -> &'static str {
        self.id
    }

    fn domains(&self) -> &'static [&'static str] {
        &[]
    }

    fn build_seed_urls(
        &self,
        _query: &str,
        _location: Option<&str>,
    ) -> Result<Vec<Url>, AdapterError> {
        Ok(vec![self.seed.clone()])
    }
}

/// Sink that keeps records in memory for assertions
#[derive(Clone, Default)]
struct MemorySink {
    records: Arc<Mutex<Vec<JobRecord>>>,
}

impl MemorySink {
    fn titles(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.title.clone().unwrap_or_default())
            .collect()
    }
}

impl RecordSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn write_record(&mut self, record: &JobRecord) -> OutputResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// Creates a test configuration with no politeness delay and fast retries
fn create_test_config() -> Config {
    Config {
        search: SearchConfig {
            sites: vec![],
            query: "pharmacist".to_string(),
            location: Some("Zurich".to_string()),
        },
        crawler: CrawlerConfig {
            max_pages: 20,
            concurrency: 4,
            delay_ms: 0,
            timeout_ms: 5_000,
            max_retries: 2,
            retry_backoff_ms: 5,
            domain_allow: vec![],
        },
        ..Config::default()
    }
}

fn board(id: &'static str, server: &MockServer, seed_path: &str) -> Arc<dyn SiteAdapter> {
    Arc::new(MockBoard {
        id,
        seed: Url::parse(&format!("{}{}", server.uri(), seed_path)).unwrap(),
    })
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn posting(json: &str) -> String {
    format!(r#"<script type="application/ld+json">{}</script>"#, json)
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn run(
    config: Config,
    adapters: Vec<Arc<dyn SiteAdapter>>,
) -> (jobsweep::output::RunSummary, MemorySink) {
    let sink = MemorySink::default();
    let crawler = Crawler::with_adapters(config, adapters).unwrap();
    let sinks: Vec<Box<dyn RecordSink>> = vec![Box::new(sink.clone())];
    let summary = crawler.run(sinks).await.unwrap();
    (summary, sink)
}

#[tokio::test]
async fn test_full_crawl_with_pagination_and_dedup() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    mount_page(
        &server,
        "/search",
        html(
            r#"<a href="/jobs/1">Pharmacist</a>
               <a href="/jobs/2">Nurse</a>
               <a href="/about">About us</a>
               <a href="/listing?page=2">Next</a>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        "/jobs/1",
        html(&posting(
            r#"{"@type": "JobPosting", "title": "Pharmacist", "url": "/jobs/1",
                "hiringOrganization": {"name": "Acme"},
                "jobLocation": {"address": {"addressLocality": "Zurich", "addressCountry": "CH"}}}"#,
        )),
    )
    .await;
    mount_page(
        &server,
        "/jobs/2",
        html(&posting(r#"{"@type": "JobPosting", "title": "Nurse", "hiringOrganization": "Spital"}"#)),
    )
    .await;
    mount_page(
        &server,
        "/listing",
        html(r#"<a href="/jobs/3">Pharmacist again</a><a href="/jobs/1">Seen</a>"#),
    )
    .await;
    mount_page(
        &server,
        "/jobs/3",
        html(&posting(
            r#"{"@type": "JobPosting", "title": "Pharmacist", "url": "/jobs/1",
                "hiringOrganization": {"name": "Acme"},
                "jobLocation": {"address": {"addressLocality": "Zurich", "addressCountry": "CH"}}}"#,
        )),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("About"))
        .expect(0)
        .mount(&server)
        .await;

    let (summary, sink) = run(
        create_test_config(),
        vec![board("mockboard", &server, "/search?q=pharmacist")],
    )
    .await;

    assert_eq!(summary.pages_fetched, 5);
    assert_eq!(summary.collected, 3);
    assert_eq!(summary.kept, 2);
    assert_eq!(summary.duplicates, 1);
    assert!(!summary.cancelled);

    let report = summary.site("mockboard").unwrap();
    assert_eq!(report.state, SiteState::Exhausted);
    assert_eq!(report.records, 3);

    assert_eq!(sink.titles(), vec!["Pharmacist", "Nurse"]);
    let records = sink.records.lock().unwrap();
    assert_eq!(records[0].company.as_deref(), Some("Acme"));
    assert_eq!(records[0].location.as_deref(), Some("Zurich, CH"));
    assert_eq!(records[0].source.as_deref(), Some("mockboard"));
    assert_eq!(
        records[0].url.as_deref(),
        Some(format!("{}/jobs/1", server.uri()).as_str())
    );
    assert_eq!(
        records[1].url.as_deref(),
        Some(format!("{}/jobs/2", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_unsupported_site_skipped_others_crawled() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_page(
        &server,
        "/search",
        html(&posting(r#"{"@type": "JobPosting", "title": "Chemist"}"#)),
    )
    .await;

    let restricted: Arc<dyn SiteAdapter> = Arc::new(RestrictedSite {
        id: "linkedin",
        domains: &["www.linkedin.com"],
        reason: "terms of service",
    });

    let (summary, sink) = run(
        create_test_config(),
        vec![restricted, board("mockboard", &server, "/search")],
    )
    .await;

    assert_eq!(summary.sites_skipped, 1);
    assert_eq!(summary.sites_crawled, 1);

    let skipped = summary.site("linkedin").unwrap();
    assert_eq!(skipped.state, SiteState::Exhausted);
    assert_eq!(skipped.pages_fetched, 0);
    assert_eq!(skipped.records, 0);
    assert!(skipped.skipped.is_some());

    assert_eq!(sink.titles(), vec!["Chemist"]);
}

#[tokio::test]
async fn test_failing_url_contributes_nothing_and_site_finishes() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_page(
        &server,
        "/search",
        html(r#"<a href="/jobs/broken">Broken</a><a href="/jobs/ok">Ok</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/jobs/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/jobs/ok",
        html(&posting(r#"{"@type": "JobPosting", "title": "Survivor"}"#)),
    )
    .await;

    let result = tokio::time::timeout(
        Duration::from_secs(30),
        run(create_test_config(), vec![board("mockboard", &server, "/search")]),
    )
    .await;
    let (summary, sink) = result.expect("crawl should not hang");

    let report = summary.site("mockboard").unwrap();
    assert_eq!(report.state, SiteState::Exhausted);
    assert_eq!(report.fetch_failures, 1);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(sink.titles(), vec!["Survivor"]);
}

#[tokio::test]
async fn test_page_budget_limits_fetches() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_page(
        &server,
        "/search",
        html(
            r#"<a href="/jobs/1">1</a><a href="/jobs/2">2</a><a href="/jobs/3">3</a>
               <a href="/search?page=2">Next</a>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        "/jobs/1",
        html(&posting(r#"{"@type": "JobPosting", "title": "One"}"#)),
    )
    .await;
    for unreachable in ["/jobs/2", "/jobs/3"] {
        Mock::given(method("GET"))
            .and(path(unreachable))
            .respond_with(html("never"))
            .expect(0)
            .mount(&server)
            .await;
    }

    let mut config = create_test_config();
    config.crawler.max_pages = 2;

    let (summary, sink) = run(config, vec![board("mockboard", &server, "/search")]).await;

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(sink.titles(), vec!["One"]);
    assert_eq!(summary.site("mockboard").unwrap().state, SiteState::Exhausted);
}

#[tokio::test]
async fn test_pager_with_prev_link_reaches_later_pages() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;

    let pages = [
        ("1", r#"<a href="/jobs?page=2">Next</a>"#.to_string()),
        (
            "2",
            r#"<a href="/jobs?page=1">Prev</a><a href="/jobs?page=3">Next</a>"#.to_string(),
        ),
        (
            "3",
            format!(
                r#"<a href="/jobs?page=2">Prev</a>{}"#,
                posting(r#"{"@type": "JobPosting", "title": "Deep"}"#)
            ),
        ),
    ];
    for (number, body) in pages {
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .and(query_param("page", number))
            .respond_with(html(&body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let (summary, sink) = run(
        create_test_config(),
        vec![board("mockboard", &server, "/jobs?page=1")],
    )
    .await;

    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(sink.titles(), vec!["Deep"]);
}

#[tokio::test]
async fn test_robots_disallow_skips_url_without_request() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /jobs/secret").await;
    mount_page(
        &server,
        "/search",
        html(r#"<a href="/jobs/secret">Secret</a><a href="/jobs/1">Open</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/jobs/secret"))
        .respond_with(html(&posting(r#"{"@type": "JobPosting", "title": "Secret"}"#)))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/jobs/1",
        html(&posting(r#"{"@type": "JobPosting", "title": "Open"}"#)),
    )
    .await;

    let (summary, sink) = run(
        create_test_config(),
        vec![board("mockboard", &server, "/search")],
    )
    .await;

    assert_eq!(summary.policy_denied, 1);
    assert_eq!(sink.titles(), vec!["Open"]);
}

#[tokio::test]
async fn test_host_outside_allow_list_never_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("anything"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.domain_allow = vec!["jobs.ch".to_string()];

    let (summary, _) = run(config, vec![board("mockboard", &server, "/search")]).await;

    assert_eq!(summary.pages_fetched, 0);
    assert_eq!(summary.site("mockboard").unwrap().state, SiteState::Exhausted);
}

#[tokio::test]
async fn test_same_posting_on_two_sites_kept_once() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    let shared = posting(
        r#"{"@type": "JobPosting", "title": "Pharmacist", "url": "https://example.test/jobs/77",
            "hiringOrganization": {"name": "Acme"}}"#,
    );
    mount_page(&server, "/a", html(&shared)).await;
    mount_page(&server, "/b", html(&shared)).await;

    let (summary, sink) = run(
        create_test_config(),
        vec![
            board("board-a", &server, "/a"),
            board("board-b", &server, "/b"),
        ],
    )
    .await;

    assert_eq!(summary.collected, 2);
    assert_eq!(summary.kept, 1);
    assert_eq!(sink.titles(), vec!["Pharmacist"]);
}

#[tokio::test]
async fn test_cancellation_stops_crawl_and_keeps_collected_records() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_page(
        &server,
        "/search",
        html(&format!(
            r#"{}<a href="/jobs/1">1</a><a href="/jobs/2">2</a>"#,
            posting(r#"{"@type": "JobPosting", "title": "First"}"#)
        )),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/jobs/1"))
        .respond_with(html("late"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.delay_ms = 60_000;

    let cancel = CancellationToken::new();
    let sink = MemorySink::default();
    let crawler = Crawler::with_adapters(config, vec![board("mockboard", &server, "/search")])
        .unwrap()
        .with_cancellation(cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let summary = tokio::time::timeout(
        Duration::from_secs(20),
        crawler.run(vec![Box::new(sink.clone()) as Box<dyn RecordSink>]),
    )
    .await
    .expect("cancelled crawl should finish promptly")
    .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.site("mockboard").unwrap().state, SiteState::Exhausted);
    assert_eq!(sink.titles(), vec!["First"]);
}

#[tokio::test]
async fn test_file_sinks_written() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_page(
        &server,
        "/search",
        html(&posting(
            r#"{"@type": "JobPosting", "title": "Pharmacist", "salary": "CHF 100k",
                "jobLocation": {"address": {"addressLocality": "Bern", "addressCountry": "CH"}}}"#,
        )),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let jsonl = dir.path().join("jobs.jsonl");
    let csv = dir.path().join("jobs.csv");
    let mut config = create_test_config();
    config.output = OutputConfig {
        jsonl_path: Some(jsonl.display().to_string()),
        csv_path: Some(csv.display().to_string()),
    };

    let sinks = open_sinks(&config.output).unwrap();
    let crawler =
        Crawler::with_adapters(config, vec![board("mockboard", &server, "/search")]).unwrap();
    let summary = crawler.run(sinks).await.unwrap();
    assert_eq!(summary.kept, 1);

    let lines = std::fs::read_to_string(&jsonl).unwrap();
    let record: serde_json::Value = serde_json::from_str(lines.trim()).unwrap();
    assert_eq!(record["title"], "Pharmacist");
    assert_eq!(record["location"], "Bern, CH");
    assert_eq!(record["salary"], "CHF 100k");
    assert_eq!(record["source"], "mockboard");
    assert_eq!(record["raw"]["@type"], "JobPosting");

    let table = std::fs::read_to_string(&csv).unwrap();
    let rows: Vec<&str> = table.lines().collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("title,company,location,description,datePosted"));
    assert!(rows[1].starts_with("Pharmacist,,\"Bern, CH\""));
    assert!(!table.contains("JobPosting"));
}

#[tokio::test]
async fn test_query_param_seed_reaches_server() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "pharmacist"))
        .respond_with(html(&posting(r#"{"@type": "JobPosting", "title": "Matched"}"#)))
        .expect(1)
        .mount(&server)
        .await;

    let (_, sink) = run(
        create_test_config(),
        vec![board("mockboard", &server, "/search?q=pharmacist")],
    )
    .await;

    assert_eq!(sink.titles(), vec!["Matched"]);
}
