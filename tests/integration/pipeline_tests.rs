use channel_harvest::listing::{Category, Concurrency, ListingSource, Metric, RunParameters};
use channel_harvest::output::{artifact_path, JsonFileSink, OutputResult, OutputSink};
use channel_harvest::pipeline::{
    harvest, run_pipeline, FailureKind, Identifier, PipelineSettings, ResolveSettings,
};
use channel_harvest::render::{RenderError, RenderEventKind, StaticRenderer};
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

const BASE: &str = "https://socialblade.com";
const LISTING: &str = "https://socialblade.com/youtube/top/category/tech/mostsubscribed";

fn settings() -> PipelineSettings {
    PipelineSettings {
        base_url: BASE.to_string(),
        resolve: ResolveSettings {
            wait_timeout: Duration::from_millis(20),
        },
    }
}

fn params(concurrency: usize) -> RunParameters {
    RunParameters {
        source: ListingSource::Category(Category::Tech),
        metric: Metric::MostSubscribed,
        concurrency: Concurrency::new(concurrency).unwrap(),
    }
}

fn wrapper(href: &str) -> String {
    format!(
        r#"<div style="float: left; width: 350px; line-height: 25px;"><a href="{}">channel</a></div>"#,
        href
    )
}

fn listing(hrefs: &[&str]) -> String {
    let entries: String = hrefs.iter().map(|h| wrapper(h)).collect();
    format!("<html><body>{}</body></html>", entries)
}

fn channel_page(href: &str) -> String {
    format!(
        r#"<html><body><a class="core-button -margin core-small-wide ui-black" href="{}">Visit</a></body></html>"#,
        href
    )
}

fn search_page(text: &str) -> String {
    format!(
        r#"<html><body><div style="margin-left: 10px; font-size: 0.7em; color:#aaa;">{}</div></body></html>"#,
        text
    )
}

/// Counts writes and keeps what each one received
#[derive(Default)]
struct CountingSink {
    writes: Mutex<Vec<Vec<Identifier>>>,
}

impl CountingSink {
    fn into_writes(self) -> Vec<Vec<Identifier>> {
        self.writes.into_inner().unwrap()
    }
}

impl OutputSink for CountingSink {
    fn write(&self, identifiers: &[Identifier]) -> OutputResult<()> {
        self.writes.lock().unwrap().push(identifiers.to_vec());
        Ok(())
    }
}

fn sorted(ids: &[Identifier]) -> Vec<String> {
    let mut ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_end_to_end_with_malformed_entries() {
    let channels = ["abc", "def", "ghi", "jkl", "mno"];

    let mut hrefs: Vec<String> = channels
        .iter()
        .map(|c| format!("/youtube/user/{}", c))
        .collect();
    hrefs.insert(1, "/youtube/user/broken%ZZ".to_string());
    hrefs.insert(4, "/youtube/user/%E0%A4%A".to_string());
    let href_refs: Vec<&str> = hrefs.iter().map(String::as_str).collect();

    let mut renderer = StaticRenderer::new().with_document(LISTING, listing(&href_refs));
    for channel in channels {
        renderer = renderer.with_document(
            format!("{}/youtube/user/{}", BASE, channel),
            channel_page(&format!("https://www.youtube.com/channel/{}", channel)),
        );
    }

    let sink = CountingSink::default();
    let report = harvest(&renderer, &params(3), &settings(), &sink)
        .await
        .unwrap();

    assert_eq!(report.statistics.links_examined, 7);
    assert_eq!(report.statistics.links_dropped, 2);
    assert_eq!(report.statistics.links_scheduled, 5);
    // ceil(5 / 3) = 2 links per batch
    assert_eq!(report.statistics.batches, 3);
    assert_eq!(sorted(&report.identifiers), vec!["abc", "def", "ghi", "jkl", "mno"]);

    let writes = sink.into_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(sorted(&writes[0]), vec!["abc", "def", "ghi", "jkl", "mno"]);
}

#[tokio::test]
async fn test_artifact_is_named_after_run_and_holds_identifiers() {
    let renderer = StaticRenderer::new()
        .with_document(LISTING, listing(&["/youtube/user/one"]))
        .with_document(
            format!("{}/youtube/user/one", BASE),
            channel_page("https://www.youtube.com/channel/UCone"),
        );

    let dir = TempDir::new().unwrap();
    let stamp = Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 0).unwrap();
    let path = artifact_path(dir.path(), &params(3), &stamp);

    harvest(&renderer, &params(3), &settings(), &JsonFileSink::new(&path))
        .await
        .unwrap();

    let written: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, vec!["UCone"]);
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "tech_mostsubscribed_2024-01-02T03-04pm.json"
    );
}

#[tokio::test]
async fn test_both_branches_in_one_run() {
    let renderer = StaticRenderer::new()
        .with_document(
            LISTING,
            listing(&["/youtube/user/direct", "/youtube/user/fallback"]),
        )
        .with_document(
            "https://socialblade.com/youtube/user/direct",
            channel_page("https://www.youtube.com/channel/UCdirect"),
        )
        .with_redirect(
            "https://socialblade.com/youtube/user/fallback",
            "https://socialblade.com/youtube/search/fallback",
        )
        .with_document(
            "https://socialblade.com/youtube/search/fallback",
            search_page("UCfromsearch"),
        );

    let report = run_pipeline(&renderer, &params(5), &settings()).await;

    assert_eq!(sorted(&report.identifiers), vec!["UCdirect", "UCfromsearch"]);
    assert_eq!(report.statistics.failed(), 0);
}

#[tokio::test]
async fn test_failing_link_is_isolated() {
    let hrefs: Vec<String> = (0..6).map(|i| format!("/youtube/user/c{}", i)).collect();
    let href_refs: Vec<&str> = hrefs.iter().map(String::as_str).collect();

    let mut renderer = StaticRenderer::new().with_document(LISTING, listing(&href_refs));
    for i in 0..6 {
        renderer = renderer.with_document(
            format!("{}/youtube/user/c{}", BASE, i),
            channel_page(&format!("/channel/id{}", i)),
        );
    }
    let slow = format!("{}/youtube/user/c1", BASE);
    renderer = renderer
        .with_delay(slow.clone(), Duration::from_millis(30))
        .with_failure(slow.clone(), RenderError::Timeout { url: slow });

    let report = run_pipeline(&renderer, &params(5), &settings()).await;

    assert_eq!(
        sorted(&report.identifiers),
        vec!["id0", "id2", "id3", "id4", "id5"]
    );
    assert_eq!(report.statistics.failures.get(&FailureKind::LoadTimeout), Some(&1));
    assert_eq!(report.statistics.resolved, 5);
    assert_eq!(renderer.open_pages(), 0);
}

#[tokio::test]
async fn test_batch_barrier_bounds_in_flight_loads() {
    let hrefs: Vec<String> = (0..9).map(|i| format!("/youtube/user/c{}", i)).collect();
    let href_refs: Vec<&str> = hrefs.iter().map(String::as_str).collect();

    let mut renderer = StaticRenderer::new().with_document(LISTING, listing(&href_refs));
    for i in 0..9 {
        let url = format!("{}/youtube/user/c{}", BASE, i);
        renderer = renderer
            .with_document(url.clone(), channel_page(&format!("/channel/id{}", i)))
            .with_delay(url, Duration::from_millis(5 + (i as u64 % 3) * 5));
    }

    // 9 links at concurrency 5: batches of ceil(9 / 5) = 2
    let report = run_pipeline(&renderer, &params(5), &settings()).await;
    assert_eq!(report.statistics.batches, 5);
    assert_eq!(report.identifiers.len(), 9);
    assert!(renderer.peak_in_flight() <= 2);

    // Batch k+1 starts only after every page of batch k was closed
    let events: Vec<_> = renderer
        .events()
        .into_iter()
        .filter(|e| e.url != LISTING)
        .collect();
    let mut position: HashMap<(String, RenderEventKind), usize> = HashMap::new();
    for event in &events {
        position.insert((event.url.clone(), event.kind), event.sequence);
    }

    let links: Vec<String> = (0..9).map(|i| format!("{}/youtube/user/c{}", BASE, i)).collect();
    for pair in links.chunks(2).collect::<Vec<_>>().windows(2) {
        let (current, next) = (pair[0], pair[1]);
        let last_close = current
            .iter()
            .map(|url| position[&(url.clone(), RenderEventKind::Closed)])
            .max()
            .unwrap();
        let first_start = next
            .iter()
            .map(|url| position[&(url.clone(), RenderEventKind::LoadStarted)])
            .min()
            .unwrap();
        assert!(last_close < first_start, "batch overlap: {:?}", pair);
    }
}

#[tokio::test]
async fn test_country_cap_limits_resolution() {
    let hrefs: Vec<String> = (0..10).map(|i| format!("/youtube/user/c{}", i)).collect();
    let href_refs: Vec<&str> = hrefs.iter().map(String::as_str).collect();
    let country_listing = "https://socialblade.com/youtube/top/country/jp/mostviewed";

    let mut renderer = StaticRenderer::new().with_document(country_listing, listing(&href_refs));
    for i in 0..10 {
        renderer = renderer.with_document(
            format!("{}/youtube/user/c{}", BASE, i),
            channel_page(&format!("/channel/id{}", i)),
        );
    }

    let params = RunParameters {
        source: ListingSource::country("JP".parse().unwrap(), 3).unwrap(),
        metric: Metric::MostViewed,
        concurrency: Concurrency::new(1).unwrap(),
    };
    let report = run_pipeline(&renderer, &params, &settings()).await;

    assert_eq!(report.statistics.links_examined, 10);
    assert_eq!(report.statistics.links_scheduled, 3);
    assert_eq!(sorted(&report.identifiers), vec!["id0", "id1", "id2"]);
    assert_eq!(report.statistics.batches, 1);
}

#[tokio::test]
async fn test_listing_failure_still_persists_empty_artifact() {
    let renderer = StaticRenderer::new();
    let sink = CountingSink::default();

    let report = harvest(&renderer, &params(10), &settings(), &sink)
        .await
        .unwrap();
    assert!(report.statistics.listing_error.is_some());
    assert_eq!(sink.into_writes(), vec![Vec::<Identifier>::new()]);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("out.json");
    harvest(&renderer, &params(10), &settings(), &JsonFileSink::new(&path))
        .await
        .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
}
