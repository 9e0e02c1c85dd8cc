// src/ingest/mod.rs
pub mod article;
pub mod feed;
pub mod filter;
pub mod normalize;
pub mod types;

pub use normalize::normalize_text;

use crate::ingest::article::{ArticleFetcher, ArticleText};
use crate::ingest::types::{Entry, FeedSource};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// One-time metrics registration (so series show up in the text dump).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("brief_entries_parsed_total", "Entries parsed from feeds.");
        describe_counter!("brief_entries_fetched_total", "Entries fetched in a run.");
        describe_counter!(
            "brief_provider_errors_total",
            "Feed fetch/parse errors."
        );
        describe_counter!(
            "brief_article_errors_total",
            "Article page fetch errors."
        );
        describe_histogram!("brief_feed_parse_ms", "Feed parse time in milliseconds.");
        describe_counter!("brief_entries_filtered_total", "Entries removed by filters.");
        describe_counter!(
            "brief_entries_deduplicated_total",
            "Entries removed as duplicates."
        );
        describe_gauge!("brief_entries_selected", "Entries in the latest brief.");
        describe_gauge!("brief_last_run_ts", "Unix ts of the last completed run.");
    });
}

#[derive(Debug, Default)]
pub struct FetchReport {
    pub entries: Vec<Entry>,
    pub provider_errors: usize,
}

/// Fetch every feed in order. A failing feed is logged and skipped.
pub async fn fetch_all(providers: &[Box<dyn FeedSource>]) -> FetchReport {
    ensure_metrics_described();

    let mut report = FetchReport::default();
    for p in providers {
        match p.fetch_entries().await {
            Ok(mut v) => {
                tracing::info!(target: "ingest", provider = p.name(), entries = v.len(), "feed fetched");
                report.entries.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = p.name(), "provider error");
                counter!("brief_provider_errors_total").increment(1);
                report.provider_errors += 1;
            }
        }
    }
    counter!("brief_entries_fetched_total").increment(report.entries.len() as u64);
    report
}

/// Article text for each entry link, keyed by link. Failures are skipped.
pub async fn fetch_articles(
    fetcher: &dyn ArticleFetcher,
    entries: &[Entry],
) -> HashMap<String, ArticleText> {
    ensure_metrics_described();

    let mut out = HashMap::new();
    for e in entries {
        if e.link.is_empty() || out.contains_key(&e.link) {
            continue;
        }
        match fetcher.fetch(&e.link).await {
            Ok(text) if !text.is_empty() => {
                out.insert(e.link.clone(), text);
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(target: "ingest", error = ?err, link = %e.link, "article fetch failed");
                counter!("brief_article_errors_total").increment(1);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::feed::FeedProvider;

    struct Failing;

    #[async_trait::async_trait]
    impl FeedSource for Failing {
        async fn fetch_entries(&self) -> anyhow::Result<Vec<Entry>> {
            anyhow::bail!("boom")
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    const RSS: &str = r#"<rss version="2.0"><channel><title>t</title>
<item><title>Venezuela talks</title><link>https://example.com/a</link></item>
</channel></rss>"#;

    #[tokio::test]
    async fn failing_feed_does_not_abort_batch() {
        let providers: Vec<Box<dyn FeedSource>> = vec![
            Box::new(Failing),
            Box::new(FeedProvider::from_fixture("https://example.com/rss", RSS)),
        ];
        let report = fetch_all(&providers).await;
        assert_eq!(report.provider_errors, 1);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].title, "Venezuela talks");
    }
}
