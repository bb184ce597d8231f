//! HTTP render engine tests
//!
//! These tests run the HTTP renderer and the full pipeline against a
//! wiremock server standing in for the listing site.

use channel_harvest::config::{Config, RenderConfig};
use channel_harvest::listing::{Category, Concurrency, ListingSource, Metric, RunParameters};
use channel_harvest::pipeline::{harvest_to_file, run_pipeline, PipelineSettings, ResolveSettings};
use channel_harvest::render::{HttpRenderer, Page, RenderError, Renderer};
use chrono::Local;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const META: &str = r#"<div style="margin-left: 10px; font-size: 0.7em; color:#aaa;">UCfromsearch</div>"#;
const VISIT: &str = r#"<a class="core-button -margin core-small-wide ui-black" href="https://www.youtube.com/channel/UCdirect">Visit</a>"#;

fn fast_config() -> RenderConfig {
    RenderConfig {
        load_timeout_ms: 2_000,
        wait_timeout_ms: 300,
        poll_interval_ms: 20,
        ..RenderConfig::default()
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html")
        .set_body_string(format!("<html><body>{}</body></html>", body))
}

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_load_follows_redirect_to_final_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/user/moved"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/youtube/search/moved"))
        .mount(&server)
        .await;
    mount_html(&server, "/youtube/search/moved", META).await;

    let renderer = HttpRenderer::new(&fast_config()).unwrap();
    let page = renderer
        .load(&format!("{}/youtube/user/moved", server.uri()))
        .await
        .unwrap();

    assert_eq!(
        page.current_url(),
        format!("{}/youtube/search/moved", server.uri())
    );
    assert_eq!(page.query("div").unwrap().len(), 1);
    page.close().await;
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/user/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let renderer = HttpRenderer::new(&fast_config()).unwrap();
    let result = renderer
        .load(&format!("{}/youtube/user/gone", server.uri()))
        .await;

    assert!(matches!(
        result,
        Err(RenderError::HttpStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/user/slow"))
        .respond_with(html(VISIT).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let config = RenderConfig {
        load_timeout_ms: 100,
        ..fast_config()
    };
    let renderer = HttpRenderer::new(&config).unwrap();
    let result = renderer
        .load(&format!("{}/youtube/user/slow", server.uri()))
        .await;

    assert!(matches!(result, Err(RenderError::Timeout { .. })));
}

#[tokio::test]
async fn test_wait_for_picks_up_late_element() {
    let server = MockServer::start().await;

    // First response lacks the button, later ones carry it
    Mock::given(method("GET"))
        .and(path("/youtube/user/late"))
        .respond_with(html("<p>loading</p>"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_html(&server, "/youtube/user/late", VISIT).await;

    let renderer = HttpRenderer::new(&fast_config()).unwrap();
    let page = renderer
        .load(&format!("{}/youtube/user/late", server.uri()))
        .await
        .unwrap();

    let element = page
        .wait_for(
            "a.core-button.-margin.core-small-wide.ui-black",
            Duration::from_millis(500),
        )
        .await
        .unwrap();
    assert_eq!(
        element.attribute("href"),
        Some("https://www.youtube.com/channel/UCdirect")
    );
    page.close().await;
}

#[tokio::test]
async fn test_wait_for_missing_element_times_out() {
    let server = MockServer::start().await;
    mount_html(&server, "/youtube/user/empty", "<p>nothing here</p>").await;

    let renderer = HttpRenderer::new(&fast_config()).unwrap();
    let page = renderer
        .load(&format!("{}/youtube/user/empty", server.uri()))
        .await
        .unwrap();

    let result = page
        .wait_for("a.core-button", Duration::from_millis(100))
        .await;
    assert!(matches!(result, Err(RenderError::ElementTimeout { .. })));
    page.close().await;
}

#[tokio::test]
async fn test_full_run_against_mock_site() {
    let server = MockServer::start().await;

    let listing = [
        "/youtube/user/direct",
        "/youtube/user/fallback",
        "/youtube/user/gone",
    ]
    .iter()
    .map(|href| {
        format!(
            r#"<div style="float: left; width: 350px; line-height: 25px;"><a href="{}">c</a></div>"#,
            href
        )
    })
    .collect::<String>();

    mount_html(&server, "/youtube/top/category/music/mostviewed", &listing).await;
    mount_html(&server, "/youtube/user/direct", VISIT).await;
    Mock::given(method("GET"))
        .and(path("/youtube/user/fallback"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "/youtube/search/fallback"),
        )
        .mount(&server)
        .await;
    mount_html(&server, "/youtube/search/fallback", META).await;
    Mock::given(method("GET"))
        .and(path("/youtube/user/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let renderer = HttpRenderer::new(&fast_config()).unwrap();
    let params = RunParameters {
        source: ListingSource::Category(Category::Music),
        metric: Metric::MostViewed,
        concurrency: Concurrency::new(5).unwrap(),
    };
    let settings = PipelineSettings {
        base_url: server.uri(),
        resolve: ResolveSettings {
            wait_timeout: Duration::from_millis(300),
        },
    };

    let report = run_pipeline(&renderer, &params, &settings).await;

    let mut identifiers: Vec<String> = report
        .identifiers
        .iter()
        .map(|id| id.to_string())
        .collect();
    identifiers.sort();
    assert_eq!(identifiers, vec!["UCdirect", "UCfromsearch"]);
    assert_eq!(report.statistics.links_scheduled, 3);
    assert_eq!(report.statistics.batches, 3);
    assert_eq!(report.statistics.failed(), 1);
    assert!(report.statistics.listing_error.is_none());
}

#[tokio::test]
async fn test_unreachable_listing_yields_empty_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let renderer = HttpRenderer::new(&fast_config()).unwrap();
    let params = RunParameters {
        source: ListingSource::Category(Category::News),
        metric: Metric::MostSubscribed,
        concurrency: Concurrency::default(),
    };
    let settings = PipelineSettings {
        base_url: server.uri(),
        ..PipelineSettings::default()
    };

    let report = run_pipeline(&renderer, &params, &settings).await;

    assert!(report.identifiers.is_empty());
    assert!(report.statistics.listing_error.is_some());
}

#[tokio::test]
async fn test_harvest_to_file_persists_after_listing_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.listing.base_url = server.uri();
    config.render = fast_config();
    config.output.data_dir = dir.path().join("data").to_string_lossy().into_owned();

    let params = RunParameters {
        source: ListingSource::country("us".parse().unwrap(), 10).unwrap(),
        metric: Metric::MostViewed,
        concurrency: Concurrency::default(),
    };

    let path = harvest_to_file(&config, &params, &Local::now()).await.unwrap();

    assert!(path.starts_with(dir.path().join("data").join("country")));
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("us_mostviewed_top-10_"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
}
