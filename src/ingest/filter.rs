// src/ingest/filter.rs
//! Candidate filter ahead of dedup and scoring.
//!
//! Drops entries with no title, dated entries older than their effective
//! max age, entries hitting an exclude term, and (when required) entries
//! with no country/geo term. Undated entries always pass the age check.

use chrono::{DateTime, Utc};
use metrics::counter;

use crate::analyze::classify::sector_label;
use crate::analyze::scoring::age_days;
use crate::analyze::terms::any_hit;
use crate::config::BriefConfig;
use crate::ingest::normalize::normalize_text;
use crate::ingest::types::Entry;

#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub kept: Vec<Entry>,
    pub dropped_invalid: usize,
    pub dropped_age: usize,
    pub dropped_excluded: usize,
    pub dropped_country: usize,
}

impl FilterOutcome {
    pub fn dropped(&self) -> usize {
        self.dropped_invalid + self.dropped_age + self.dropped_excluded + self.dropped_country
    }
}

/// `true` when undated, or no older than `max_age_days` (fractional days,
/// same measure as the recency sub-score).
pub fn passes_age_filter(entry: &Entry, max_age_days: i64, now: DateTime<Utc>) -> bool {
    match entry.published_at {
        None => true,
        Some(ts) => age_days(ts, now) <= max_age_days as f64,
    }
}

/// Age horizon for this entry: its classified sector's override, else the global one.
pub fn effective_max_age(entry: &Entry, cfg: &BriefConfig) -> i64 {
    cfg.max_age_for(&sector_label(entry, cfg))
}

/// Title and summary normalized in place so every later stage reads clean text.
fn normalized(mut e: Entry) -> Entry {
    e.title = normalize_text(&e.title);
    e.summary = normalize_text(&e.summary);
    e.link = e.link.trim().to_string();
    e
}

pub fn filter_entries(entries: Vec<Entry>, cfg: &BriefConfig, now: DateTime<Utc>) -> FilterOutcome {
    let mut out = FilterOutcome::default();
    let vocab: Vec<String> = cfg.country_vocabulary().map(str::to_string).collect();

    for e in entries.into_iter().map(normalized) {
        if e.title.is_empty() {
            out.dropped_invalid += 1;
            continue;
        }
        if !passes_age_filter(&e, effective_max_age(&e, cfg), now) {
            out.dropped_age += 1;
            continue;
        }
        let text = e.text();
        if any_hit(&text, &cfg.country.exclude_terms, cfg) {
            out.dropped_excluded += 1;
            continue;
        }
        if cfg.country.require_country_match && !vocab.is_empty() && !any_hit(&text, &vocab, cfg) {
            out.dropped_country += 1;
            continue;
        }
        out.kept.push(e);
    }

    tracing::info!(
        target: "filter",
        kept = out.kept.len(),
        invalid = out.dropped_invalid,
        stale = out.dropped_age,
        excluded = out.dropped_excluded,
        off_country = out.dropped_country,
        "entries filtered"
    );
    counter!("brief_entries_filtered_total").increment(out.dropped() as u64);
    out
}
