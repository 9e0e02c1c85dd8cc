//! Fixture feeds through the whole run: fetch, shortlist, assemble, write.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use country_brief::config::BriefConfig;
use country_brief::ingest::feed::FeedProvider;
use country_brief::ingest::fetch_all;
use country_brief::ingest::types::FeedSource;
use country_brief::output::{self, INDEX_MD, LAST_RUN_JSON, LATEST_CSV, LATEST_JSON};
use country_brief::snapshot::RunSnapshot;
use country_brief::{assemble, shortlist, Brief};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const GOOGLE_NEWS_XML: &str = include_str!("fixtures/google_news_venezuela.xml");
const RELIEFWEB_ATOM: &str = include_str!("fixtures/reliefweb_venezuela.xml");

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap()
}

fn providers() -> Vec<Box<dyn FeedSource>> {
    vec![
        Box::new(FeedProvider::from_fixture(
            "https://news.google.com/rss/search?q=venezuela&hl=en-US",
            GOOGLE_NEWS_XML,
        )),
        Box::new(FeedProvider::from_fixture(
            "https://reliefweb.int/updates/rss.xml?country=250",
            RELIEFWEB_ATOM,
        )),
    ]
}

async fn run(out_dir: &Path, snapshot_path: &Path) -> (Brief, Vec<PathBuf>) {
    let cfg = BriefConfig::embedded();
    let fetched = fetch_all(&providers()).await;
    let mut list = shortlist(fetched.entries, &cfg, now());
    list.stats.provider_errors = fetched.provider_errors;

    let previous = RunSnapshot::load(snapshot_path);
    let (brief, snapshot) = assemble(list, &HashMap::new(), &previous, &cfg, now());
    let written = output::write_all(&brief, &snapshot, out_dir, snapshot_path)
        .await
        .expect("artifacts written");
    (brief, written)
}

#[tokio::test]
async fn fixture_run_counts_every_stage() {
    let dir = tempfile::tempdir().unwrap();
    let (brief, written) = run(dir.path(), &dir.path().join("snapshot.json")).await;

    let s = &brief.stats;
    assert_eq!(s.fetched, 9);
    assert_eq!(s.provider_errors, 0);
    assert_eq!(s.dropped_excluded, 1, "football item");
    assert_eq!(s.dropped_stale, 1, "January item");
    assert_eq!(s.after_filter, 7);
    assert_eq!(s.duplicates_by_link, 1, "same Google News link twice");
    assert_eq!(s.after_dedup, 6);
    assert_eq!(s.selected, 6);
    assert_eq!(brief.items.len(), 6);
    assert_eq!(written.len(), 5);

    assert_eq!(brief.diff.new, 6);
    assert!(brief.items.iter().all(|e| (0.0..=1.0).contains(&e.score())));
    assert!(brief.items.iter().all(|e| !e.summary_text.is_empty()));
    assert!(brief.items.iter().all(|e| !e.why_it_matters.is_empty()));
    assert!(!brief.narrative.starts_with("No qualifying items"));
}

#[tokio::test]
async fn procurement_notice_carries_deadline_and_amount() {
    let dir = tempfile::tempdir().unwrap();
    let (brief, _) = run(dir.path(), &dir.path().join("snapshot.json")).await;

    let wb = brief
        .items
        .iter()
        .find(|e| e.entry().source_domain == "worldbank.org")
        .expect("world bank item selected");
    assert!(wb.flags().opportunity);
    let opp = wb.opportunity.as_ref().expect("opportunity details");
    assert_eq!(opp.deadline.as_deref(), Some("March 30, 2026"));
    assert_eq!(opp.deadline_date, NaiveDate::from_ymd_opt(2026, 3, 30));
    assert!(!opp.expired);
    assert_eq!(opp.amount.as_deref(), Some("USD 12 million"));

    let sanctions = brief
        .items
        .iter()
        .find(|e| e.entry().title.contains("sanctions"))
        .expect("sanctions item selected");
    assert!(sanctions.flags().risk);
}

#[tokio::test]
async fn identical_runs_produce_identical_artifacts() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    run(a.path(), &a.path().join("snapshot.json")).await;
    run(b.path(), &b.path().join("snapshot.json")).await;

    for name in [INDEX_MD, LATEST_JSON, LAST_RUN_JSON, LATEST_CSV, "snapshot.json"] {
        let x = std::fs::read(a.path().join(name)).unwrap();
        let y = std::fs::read(b.path().join(name)).unwrap();
        assert_eq!(x, y, "{name} differs between identical runs");
    }
}

#[tokio::test]
async fn rerun_against_own_snapshot_reports_nothing_new() {
    let dir = tempfile::tempdir().unwrap();
    let snap = dir.path().join("snapshot.json");
    run(dir.path(), &snap).await;

    let (brief, written) = run(dir.path(), &snap).await;
    assert_eq!(brief.diff.new, 0);
    assert_eq!(brief.diff.updated, 0);
    assert_eq!(brief.diff.dropped, 0);
    assert_eq!(brief.diff.unchanged, 6);
    // items and snapshot are unchanged; only the diff-bearing files move
    assert!(!written.contains(&snap));
    assert!(!written.contains(&dir.path().join(LATEST_CSV)));

    let (_, third) = run(dir.path(), &snap).await;
    assert!(third.is_empty(), "steady state rewrites nothing: {third:?}");
}

#[tokio::test]
async fn markdown_lists_sections_and_pipeline_metrics() {
    let dir = tempfile::tempdir().unwrap();
    run(dir.path(), &dir.path().join("snapshot.json")).await;
    let md = std::fs::read_to_string(dir.path().join(INDEX_MD)).unwrap();

    assert!(md.starts_with("# Venezuela Brief\n"));
    assert!(md.contains("| Fetched | 9 |"));
    assert!(md.contains("| Selected | 6 |"));
    for label in BriefConfig::embedded().section_order() {
        assert!(md.contains(&format!("## {label}\n")), "missing section {label}");
    }

    let csv = std::fs::read_to_string(dir.path().join(LATEST_CSV)).unwrap();
    assert_eq!(csv.lines().count(), 7);
}
