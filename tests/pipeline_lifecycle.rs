//! Integration tests for the full pipeline: extract, dedup, normalize, load.
//!
//! Each test creates its own in-memory SQLite database and a wiremock
//! server standing in for the remote sources, then drives one or more
//! complete pipeline cycles through the public stages.

use std::time::Duration;

use warta::config::{Config, FeedSource, HtmlSource};
use warta::pipeline;
use warta::source::build_client;
use warta::storage::Database;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX_PAGE_1: &str = r#"
<html><body>
  <a href="https://news.example.com/read/2024/10/02/energi?source=index">
    <h3 class="articleTitle">Pemerintah umumkan kebijakan energi baru</h3>
    <div class="articleDate">2 Oktober 2024, 13:00 WIB</div>
  </a>
  <a href="https://news.example.com/read/2024/10/02/banjir">
    <h3 class="articleTitle">Banjir merendam sejumlah wilayah ibu kota</h3>
    <div class="articleDate">2 Oktober 2024, 14:30 WIB</div>
  </a>
  <a href="https://news.example.com/read/page/2">Next</a>
  <a href="https://news.example.com/tag/politik">
    <h3 class="articleTitle">Kumpulan berita politik terkini hari ini</h3>
  </a>
</body></html>
"#;

const INDEX_PAGE_2: &str = r#"
<html><body>
  <a href="https://news.example.com/read/2024/10/02/banjir">
    <h3 class="articleTitle">Banjir merendam sejumlah wilayah ibu kota</h3>
    <div class="articleDate">2 Oktober 2024, 14:30 WIB</div>
  </a>
  <a href="https://news.example.com/read/2024/10/02/pemilu">
    <h3 class="articleTitle">Tahapan pemilu memasuki masa kampanye</h3>
  </a>
</body></html>
"#;

const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
  <title>Feed Nasional</title>
  <item>
    <title>Presiden resmikan bendungan baru di Jawa Barat</title>
    <link>https://feed.example.com/nasional/bendungan</link>
    <pubDate>Wed, 02 Oct 2024 13:00:00 +0700</pubDate>
  </item>
  <item>
    <title>Harga beras turun menjelang panen raya</title>
    <link>https://feed.example.com/nasional/beras</link>
    <pubDate>Wed, 02 Oct 2024 14:00:00 +0700</pubDate>
  </item>
  <item>
    <title>Timnas lolos ke babak berikutnya</title>
    <link>https://feed.example.com/nasional/timnas</link>
    <pubDate>Wed, 02 Oct 2024 15:00:00 +0700</pubDate>
  </item>
  <item>
    <title>Entri rusak tanpa tautan</title>
    <pubDate>Wed, 02 Oct 2024 16:00:00 +0700</pubDate>
  </item>
</channel></rss>"#;

fn test_config(server_uri: &str) -> Config {
    Config {
        html_sources: vec![HtmlSource {
            name: "Kompas".to_string(),
            index_url: format!("{}/index?page={{page}}", server_uri),
            pages: 2,
            article_path_marker: "/read/".to_string(),
        }],
        feed_sources: vec![FeedSource {
            name: "Feed Nasional".to_string(),
            url: format!("{}/rss", server_uri),
        }],
        page_delay_ms: 0,
        ..Config::default()
    }
}

async fn mount_index_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/index"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INDEX_PAGE_1))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/index"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INDEX_PAGE_2))
        .mount(server)
        .await;
}

async fn mount_rss(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(RSS_FEED)
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .mount(server)
        .await;
}

// ============================================================================
// End-to-End Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_full_run_loads_unique_articles() {
    let server = MockServer::start().await;
    mount_index_pages(&server).await;
    mount_rss(&server).await;

    let config = test_config(&server.uri());
    let db = Database::open(":memory:").await.unwrap();
    let client = build_client(Duration::from_secs(5)).unwrap();

    let summary = pipeline::run(&config, &db, &client).await.unwrap();

    // 2 articles on page 1, 2 on page 2 (one overlapping), 3 valid feed
    // items (the link-less entry is dropped at extraction)
    assert_eq!(summary.extracted, 7);
    assert_eq!(summary.unique, 6);
    assert_eq!(summary.inserted, 6);

    assert_eq!(db.count_articles().await.unwrap(), 6);
}

#[tokio::test]
async fn test_second_run_inserts_nothing() {
    let server = MockServer::start().await;
    mount_index_pages(&server).await;
    mount_rss(&server).await;

    let config = test_config(&server.uri());
    let db = Database::open(":memory:").await.unwrap();
    let client = build_client(Duration::from_secs(5)).unwrap();

    let first = pipeline::run(&config, &db, &client).await.unwrap();
    assert_eq!(first.inserted, 6);

    // Re-scraping already-known URLs is a no-op
    let second = pipeline::run(&config, &db, &client).await.unwrap();
    assert_eq!(second.extracted, 7);
    assert_eq!(second.unique, 6);
    assert_eq!(second.inserted, 0);

    assert_eq!(db.count_articles().await.unwrap(), 6);
}

#[tokio::test]
async fn test_timestamps_normalized_to_canonical_form() {
    let server = MockServer::start().await;
    mount_index_pages(&server).await;
    mount_rss(&server).await;

    let config = test_config(&server.uri());
    let db = Database::open(":memory:").await.unwrap();
    let client = build_client(Duration::from_secs(5)).unwrap();

    pipeline::run(&config, &db, &client).await.unwrap();

    let rows = db.get_all_articles().await.unwrap();

    // Indonesian index date with WIB token
    let energi = rows
        .iter()
        .find(|r| r.url.ends_with("/read/2024/10/02/energi"))
        .unwrap();
    assert_eq!(energi.published_at, "2024-10-02T13:00:00");
    assert_eq!(energi.source, "Kompas");

    // RFC-2822 feed date, offset discarded
    let bendungan = rows
        .iter()
        .find(|r| r.url.ends_with("/nasional/bendungan"))
        .unwrap();
    assert_eq!(bendungan.published_at, "2024-10-02T13:00:00");
    assert_eq!(bendungan.source, "Feed Nasional");
}

#[tokio::test]
async fn test_tracking_params_stripped_before_load() {
    let server = MockServer::start().await;
    mount_index_pages(&server).await;
    mount_rss(&server).await;

    let config = test_config(&server.uri());
    let db = Database::open(":memory:").await.unwrap();
    let client = build_client(Duration::from_secs(5)).unwrap();

    pipeline::run(&config, &db, &client).await.unwrap();

    let rows = db.get_all_articles().await.unwrap();
    assert!(rows.iter().all(|r| !r.url.contains('?')));
}

// ============================================================================
// Failure Isolation Tests
// ============================================================================

#[tokio::test]
async fn test_failed_source_degrades_but_run_completes() {
    let server = MockServer::start().await;
    // Index pages are down entirely; only the feed responds
    Mock::given(method("GET"))
        .and(path("/index"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_rss(&server).await;

    let config = test_config(&server.uri());
    let db = Database::open(":memory:").await.unwrap();
    let client = build_client(Duration::from_secs(5)).unwrap();

    let summary = pipeline::run(&config, &db, &client).await.unwrap();
    assert_eq!(summary.extracted, 3);
    assert_eq!(summary.inserted, 3);
}

#[tokio::test]
async fn test_single_failed_page_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INDEX_PAGE_1))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/index"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_rss(&server).await;

    let config = test_config(&server.uri());
    let db = Database::open(":memory:").await.unwrap();
    let client = build_client(Duration::from_secs(5)).unwrap();

    let summary = pipeline::run(&config, &db, &client).await.unwrap();
    // Page 1 contributes 2, page 2 nothing, feed 3
    assert_eq!(summary.extracted, 5);
    assert_eq!(summary.inserted, 5);
}

#[tokio::test]
async fn test_all_sources_down_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let db = Database::open(":memory:").await.unwrap();
    let client = build_client(Duration::from_secs(5)).unwrap();

    // Total input absence is the one failure that escalates to the caller
    let result = pipeline::run(&config, &db, &client).await;
    assert!(result.is_err());
    assert_eq!(db.count_articles().await.unwrap(), 0);
}

// ============================================================================
// Cross-Source Deduplication Tests
// ============================================================================

#[tokio::test]
async fn test_syndicated_story_stored_once() {
    let server = MockServer::start().await;

    // The same permalink appears on the index page and in the feed (with a
    // tracking parameter); canonical-URL dedup must collapse them
    let index = r#"
        <a href="https://news.example.com/read/2024/10/02/sama">
          <h3 class="articleTitle">Cerita yang sama dari dua sumber</h3>
        </a>
    "#;
    let rss = r#"<rss version="2.0"><channel><item>
        <title>Cerita yang sama dari dua sumber</title>
        <link>https://news.example.com/read/2024/10/02/sama?utm_source=rss</link>
        <pubDate>Wed, 02 Oct 2024 13:00:00 +0700</pubDate>
    </item></channel></rss>"#;

    Mock::given(method("GET"))
        .and(path("/index"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss))
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.html_sources[0].pages = 1;

    let db = Database::open(":memory:").await.unwrap();
    let client = build_client(Duration::from_secs(5)).unwrap();

    let summary = pipeline::run(&config, &db, &client).await.unwrap();
    assert_eq!(summary.extracted, 2);
    assert_eq!(summary.unique, 1);
    assert_eq!(summary.inserted, 1);

    let rows = db.get_all_articles().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].url, "https://news.example.com/read/2024/10/02/sama");
}
