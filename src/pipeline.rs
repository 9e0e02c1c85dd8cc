// src/pipeline.rs
//! One run, start to finish, over already-fetched entries:
//! filter → dedup → rank → classify → select, then annotate → synthesize → diff.
//!
//! Split in two so the caller can fetch article pages for the shortlist only.

use chrono::{DateTime, Utc};
use metrics::gauge;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::analyze::types::{AnnotatedEntry, ClassifiedEntry};
use crate::analyze::{annotate, classify_entry, deduplicate_with_stats, rank, select_top};
use crate::config::BriefConfig;
use crate::ingest::article::ArticleText;
use crate::ingest::filter::filter_entries;
use crate::ingest::types::Entry;
use crate::snapshot::{diff, RunSnapshot, SnapshotDiff};
use crate::synth::exec::{exec_rows, ExecRow};
use crate::synth::narrative::{narrative, section_briefs, SectionBrief};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub fetched: usize,
    pub provider_errors: usize,
    pub dropped_invalid: usize,
    pub dropped_stale: usize,
    pub dropped_excluded: usize,
    pub dropped_off_country: usize,
    pub after_filter: usize,
    pub duplicates_by_link: usize,
    pub duplicates_by_title: usize,
    pub after_dedup: usize,
    pub selected: usize,
    pub articles_fetched: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

impl ScoreSummary {
    pub fn of(scores: impl Iterator<Item = f64>) -> Self {
        let v: Vec<f64> = scores.collect();
        if v.is_empty() {
            return Self::default();
        }
        let sum: f64 = v.iter().sum();
        let round4 = |x: f64| (x * 10_000.0).round() / 10_000.0;
        Self {
            count: v.len(),
            average: round4(sum / v.len() as f64),
            max: v.iter().copied().fold(f64::MIN, f64::max),
            min: v.iter().copied().fold(f64::MAX, f64::min),
        }
    }
}

/// Ranked, sector-diverse candidates before annotation.
#[derive(Debug, Clone)]
pub struct Shortlist {
    pub selected: Vec<ClassifiedEntry>,
    pub stats: RunStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    pub generated_at: DateTime<Utc>,
    pub country: String,
    pub stats: RunStats,
    pub score_summary: ScoreSummary,
    pub narrative: String,
    pub sections: Vec<SectionBrief>,
    pub exec_rows: Vec<ExecRow>,
    pub items: Vec<AnnotatedEntry>,
    pub diff: SnapshotDiff,
}

/// Filter, dedup, rank, classify and select. Pure given `now`.
pub fn shortlist(entries: Vec<Entry>, cfg: &BriefConfig, now: DateTime<Utc>) -> Shortlist {
    crate::ingest::ensure_metrics_described();

    let mut stats = RunStats {
        fetched: entries.len(),
        ..Default::default()
    };

    let filtered = filter_entries(entries, cfg, now);
    stats.dropped_invalid = filtered.dropped_invalid;
    stats.dropped_stale = filtered.dropped_age;
    stats.dropped_excluded = filtered.dropped_excluded;
    stats.dropped_off_country = filtered.dropped_country;
    stats.after_filter = filtered.kept.len();

    let deduped = deduplicate_with_stats(filtered.kept, cfg);
    stats.duplicates_by_link = deduped.dropped_by_link;
    stats.duplicates_by_title = deduped.dropped_by_title;
    stats.after_dedup = deduped.kept.len();
    metrics::counter!("brief_entries_deduplicated_total").increment(deduped.dropped() as u64);

    let ranked: Vec<ClassifiedEntry> = rank(deduped.kept, cfg, now)
        .into_iter()
        .map(|s| classify_entry(s, cfg))
        .collect();
    let selected = select_top(&ranked, cfg);
    stats.selected = selected.len();

    tracing::info!(
        target: "pipeline",
        fetched = stats.fetched,
        after_filter = stats.after_filter,
        after_dedup = stats.after_dedup,
        selected = stats.selected,
        "shortlist ready"
    );

    Shortlist { selected, stats }
}

/// Annotate the shortlist, build the prose and diff against `previous`.
/// Returns the brief and the snapshot to persist for the next run.
pub fn assemble(
    shortlist: Shortlist,
    articles: &HashMap<String, ArticleText>,
    previous: &RunSnapshot,
    cfg: &BriefConfig,
    now: DateTime<Utc>,
) -> (Brief, RunSnapshot) {
    let Shortlist { selected, mut stats } = shortlist;
    stats.articles_fetched = selected
        .iter()
        .filter(|e| articles.contains_key(&e.entry().link))
        .count();

    let items: Vec<AnnotatedEntry> = selected
        .into_iter()
        .map(|c| {
            let article = articles.get(&c.entry().link);
            annotate(c, article, cfg, now)
        })
        .collect();

    let current = RunSnapshot::from_selection(&items, now);
    let changes = diff(previous, &current);

    gauge!("brief_entries_selected").set(items.len() as f64);
    gauge!("brief_last_run_ts").set(now.timestamp() as f64);
    tracing::info!(
        target: "pipeline",
        selected = items.len(),
        new = changes.new,
        updated = changes.updated,
        dropped = changes.dropped,
        "brief assembled"
    );

    let brief = Brief {
        generated_at: now,
        country: cfg.country.name.clone(),
        score_summary: ScoreSummary::of(items.iter().map(|e| e.score())),
        narrative: narrative(&items, cfg),
        sections: section_briefs(&items, cfg),
        exec_rows: exec_rows(&items),
        diff: changes,
        stats,
        items,
    };
    (brief, current)
}

/// `shortlist` + `assemble` with no article text.
pub fn build_brief(
    entries: Vec<Entry>,
    previous: &RunSnapshot,
    cfg: &BriefConfig,
    now: DateTime<Utc>,
) -> (Brief, RunSnapshot) {
    assemble(shortlist(entries, cfg, now), &HashMap::new(), previous, cfg, now)
}
