//! Integration tests for the walker, the detail pipeline and the full harvest
//!
//! Walker and pipeline tests use in-process fake fetchers; the full harvest
//! runs against a wiremock storefront.

use appstore_harvest::config::{
    CatalogConfig, CategoryEntry, Config, CrawlerConfig, OutputConfig, UserAgentConfig,
};
use appstore_harvest::crawler::{
    CategoryWalker, Coordinator, DetailPipeline, FetchError, HarvestOptions, PageFetcher,
};
use appstore_harvest::state::CrawlCursor;
use appstore_harvest::storage::{LinkStore, ProgressStore, RecordStore, SqliteStorage};
use appstore_harvest::url::DetailUrlMatcher;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const CATEGORY: &str = "https://itunes.apple.com/us/genre/ios-games/id6014?mt=8";

fn listing(letter: char, page: u32) -> String {
    format!(
        "https://itunes.apple.com/us/genre/ios-games/id6014?letter={}&page={}",
        letter, page
    )
}

fn detail_url(id: u32) -> String {
    format!("https://itunes.apple.com/us/app/app-{id}/id{id}?mt=8")
}

fn detail_page(id: &str) -> String {
    format!(
        r#"<html><body>
            <div id="title"><h1>App {id}</h1></div>
            <div class="lockup product application" adam-id="{id}">
              <ul class="list"><li><div class="price">Free</div></li></ul>
            </div>
        </body></html>"#
    )
}

fn id_of(url: &str) -> &str {
    url.trim_end_matches("?mt=8").rsplit("/id").next().unwrap_or_default()
}

/// Listing pages keyed by URL; unknown URLs are empty listings. Optionally
/// fails every request to one URL.
struct ScriptedListings {
    pages: HashMap<String, String>,
    fail_on: Option<String>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedListings {
    fn new(pages: &[(char, u32, &[u32])], fail_on: Option<String>) -> Self {
        let pages = pages
            .iter()
            .map(|(letter, page, ids)| {
                let body: String = ids
                    .iter()
                    .map(|id| format!(r#"<li><a href="{}">App</a></li>"#, detail_url(*id)))
                    .collect();
                (listing(*letter, *page), format!("<ul>{}</ul>", body))
            })
            .collect();

        Self {
            pages,
            fail_on,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedListings {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.fail_on.as_deref() == Some(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            });
        }
        Ok(self.pages.get(url).cloned().unwrap_or_default())
    }
}

/// Detail fetcher that sleeps per request and records peak concurrency
struct SlowDetails {
    delay: Duration,
    invalid: Option<String>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl SlowDetails {
    fn new(delay: Duration, invalid: Option<String>) -> Self {
        Self {
            delay,
            invalid,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageFetcher for SlowDetails {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.invalid.as_deref() == Some(url) {
            return Ok("<html><body><h1>Page not found</h1></body></html>".to_string());
        }
        Ok(detail_page(id_of(url)))
    }
}

fn enqueue(storage: &SqliteStorage, ids: impl IntoIterator<Item = u32>) -> Vec<String> {
    let urls: BTreeSet<String> = ids.into_iter().map(detail_url).collect();
    storage.enqueue_links(&urls).unwrap();
    urls.into_iter().collect()
}

#[tokio::test]
async fn test_walk_terminates_after_26_empty_letters() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let fetcher = Arc::new(ScriptedListings::new(&[], None));
    let walker = CategoryWalker::new(fetcher.clone(), storage.clone(), DetailUrlMatcher::default());

    let summary = walker.walk(CATEGORY).await.unwrap();

    assert_eq!(summary.pages_fetched, 26);
    let requests = fetcher.requests();
    assert_eq!(requests.len(), 26);
    let expected: Vec<String> = ('A'..='Z').map(|l| listing(l, 1)).collect();
    assert_eq!(requests, expected);
}

#[tokio::test]
async fn test_walk_resumes_after_interruption() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("harvest.db");
    let pages: &[(char, u32, &[u32])] = &[
        ('A', 1, &[1, 2]),
        ('B', 1, &[3]),
        ('B', 2, &[4]),
        ('B', 3, &[5]),
    ];

    // first run dies on B3
    {
        let storage = Arc::new(SqliteStorage::new(&db_path).unwrap());
        let fetcher = Arc::new(ScriptedListings::new(pages, Some(listing('B', 3))));
        let walker = CategoryWalker::new(fetcher, storage.clone(), DetailUrlMatcher::default());

        assert!(walker.walk(CATEGORY).await.is_err());
        let cursor = storage.load_cursor(CATEGORY).unwrap();
        assert_eq!((cursor.letter(), cursor.page()), ('B', 3));
        assert_eq!(storage.list_links().unwrap().len(), 4);
    }

    // second run picks up exactly at B3
    let storage = Arc::new(SqliteStorage::new(&db_path).unwrap());
    let fetcher = Arc::new(ScriptedListings::new(pages, None));
    let walker = CategoryWalker::new(fetcher.clone(), storage.clone(), DetailUrlMatcher::default());

    let summary = walker.walk(CATEGORY).await.unwrap();

    let requests = fetcher.requests();
    assert_eq!(requests[0], listing('B', 3));
    assert_eq!(requests[1], listing('B', 4));
    assert_eq!(requests[2], listing('C', 1));
    assert!(!requests.contains(&listing('A', 1)));
    assert!(!requests.contains(&listing('B', 2)));
    // B3, B4, then C1..Z1
    assert_eq!(summary.pages_fetched, 2 + 24);
    assert_eq!(summary.links_enqueued, 1);
    assert_eq!(storage.list_links().unwrap().len(), 5);
}

#[tokio::test]
async fn test_rewalk_does_not_duplicate_links() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let pages: &[(char, u32, &[u32])] = &[('A', 1, &[1, 2])];

    let walker = CategoryWalker::new(
        Arc::new(ScriptedListings::new(pages, None)),
        storage.clone(),
        DetailUrlMatcher::default(),
    );
    walker.walk(CATEGORY).await.unwrap();

    storage.save_cursor(&CrawlCursor::start(CATEGORY)).unwrap();
    let summary = walker.walk(CATEGORY).await.unwrap();

    assert_eq!(summary.links_discovered, 2);
    assert_eq!(summary.links_enqueued, 0);
    assert_eq!(storage.list_links().unwrap().len(), 2);
}

#[tokio::test]
async fn test_pipeline_concurrency_bound() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    enqueue(&storage, 1..=10);
    let fetcher = Arc::new(SlowDetails::new(Duration::from_millis(50), None));

    let summary = DetailPipeline::new(fetcher.clone(), storage.clone(), 3)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stored, 10);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 10);
    let peak = fetcher.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency was {}", peak);
    assert_eq!(peak, 3);
    assert!(storage.list_links().unwrap().is_empty());
    assert_eq!(storage.counts().unwrap().apps, 10);
}

#[tokio::test]
async fn test_pipeline_isolates_invalid_document() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    enqueue(&storage, 1..=10);
    let broken = detail_url(4);
    let fetcher = Arc::new(SlowDetails::new(Duration::from_millis(5), Some(broken.clone())));

    let summary = DetailPipeline::new(fetcher, storage.clone(), 4)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stored, 9);
    assert_eq!(summary.failed, 1);
    assert_eq!(storage.list_links().unwrap(), vec![broken]);
    assert!(storage.load_app("4").unwrap().is_none());
    assert!(storage.load_app("5").unwrap().is_some());
}

#[tokio::test]
async fn test_two_links_end_to_end() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    enqueue(&storage, [11, 22]);
    let fetcher = Arc::new(SlowDetails::new(Duration::from_millis(1), None));

    DetailPipeline::new(fetcher, storage.clone(), 8).run().await.unwrap();

    assert!(storage.list_links().unwrap().is_empty());
    let first = storage.load_app("11").unwrap().unwrap();
    assert_eq!(first.record.app_name, "App 11");
    assert_eq!(first.record.price, "Free");
    assert!(storage.load_app("22").unwrap().is_some());
    assert_eq!(storage.counts().unwrap().apps, 2);
}

/// Storefront listing: two apps on A1, every other page empty
struct MockListings;

impl Respond for MockListings {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let query: HashMap<String, String> = request.url.query_pairs().into_owned().collect();
        let first_page = query.get("letter").map(String::as_str) == Some("A")
            && query.get("page").map(String::as_str) == Some("1");

        let body = if first_page {
            r#"<ul>
                <li><a href="/us/app/archery-king/id1121971067?mt=8">Archery King</a></li>
                <li><a href="/us/app/pool-party/id42?mt=8">Pool Party</a></li>
                <li><a href="/us/genre/ios-games/id6014?mt=8&letter=B">B</a></li>
            </ul>"#
        } else {
            "<ul></ul>"
        };
        ResponseTemplate::new(200).set_body_string(body)
    }
}

fn mock_config(server: &MockServer, db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_details: 2,
            request_timeout_secs: 5,
            max_attempts: 3,
        },
        user_agent: UserAgentConfig {
            identity: "HarvestTest/1.0".to_string(),
        },
        catalog: CatalogConfig {
            detail_url_pattern: r"^http://127\.0\.0\.1:\d+/us/app/[^/?#]+/id\d+\?mt=8$".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
        categories: vec![CategoryEntry {
            url: format!("{}/us/genre/ios-games/id6014?mt=8", server.uri()),
        }],
    }
}

#[tokio::test]
async fn test_harvest_against_mock_storefront() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/us/genre/ios-games/id6014"))
        .respond_with(MockListings)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/us/app/archery-king/id1121971067"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("../fixtures/detail_page.html")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/us/app/pool-party/id42"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("42")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("apps.db");
    let config = mock_config(&server, db_path.to_str().unwrap());

    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run(&HarvestOptions::default()).await.unwrap();

    assert_eq!(report.failed_walks(), 0);
    let walk = report.walks[0].result.as_ref().unwrap();
    assert_eq!(walk.links_enqueued, 2);
    // A1, A2, then B1..Z1
    assert_eq!(walk.pages_fetched, 27);

    let pipeline = report.pipeline.unwrap();
    assert_eq!(pipeline.stored, 2);

    let storage = coordinator.storage();
    assert!(storage.list_links().unwrap().is_empty());
    let archery = storage.load_app("1121971067").unwrap().unwrap();
    assert_eq!(archery.record.app_name, "Archery King");
    assert_eq!(archery.purchases.len(), 3);
    assert_eq!(archery.reviews.len(), 2);
    assert_eq!(storage.search_apps("pool").unwrap()[0].app_id, "42");
}

#[tokio::test]
async fn test_failed_details_are_quarantined_across_runs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/us/app/gone/id9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("apps.db");
    let config = mock_config(&server, db_path.to_str().unwrap());
    let coordinator = Coordinator::new(config).unwrap();

    let url = format!("{}/us/app/gone/id9?mt=8", server.uri());
    coordinator
        .storage()
        .enqueue_links(&BTreeSet::from([url.clone()]))
        .unwrap();

    let details_only = HarvestOptions {
        walk: false,
        ..HarvestOptions::default()
    };

    for _ in 0..2 {
        let report = coordinator.run(&details_only).await.unwrap();
        assert_eq!(report.pipeline.unwrap().failed, 1);
        assert_eq!(coordinator.storage().list_links().unwrap(), vec![url.clone()]);
    }

    let report = coordinator.run(&details_only).await.unwrap();
    assert_eq!(report.pipeline.unwrap().quarantined, 1);
    assert!(coordinator.storage().list_links().unwrap().is_empty());

    let quarantined = coordinator.storage().list_quarantined().unwrap();
    assert_eq!(quarantined[0].url, url);
    assert_eq!(quarantined[0].attempts, 3);
    assert!(quarantined[0].last_error.as_deref().unwrap_or_default().contains("404"));
}
