//! Duplicate removal over fetch-ordered entries.
//!
//! An entry is dropped when its non-empty link matches a retained entry, or
//! when its title key is at least `title_similarity_threshold` similar
//! (normalized Levenshtein) to any retained key. In sector-aware mode, a
//! title collision across two different sectors is not a duplicate.
//!
//! Pairwise against the retained set: fine for tens to hundreds of entries.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::analyze::classify::sector_label;
use crate::config::BriefConfig;
use crate::ingest::types::Entry;

static RE_NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("non-word regex"));

/// Lowercased title with non-word runs collapsed to one space.
pub fn title_key(title: &str) -> String {
    RE_NON_WORD
        .replace_all(&title.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Similarity in [0,1]; 1.0 means identical.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

#[derive(Debug, Default)]
pub struct DedupOutcome {
    pub kept: Vec<Entry>,
    pub dropped_by_link: usize,
    pub dropped_by_title: usize,
}

impl DedupOutcome {
    pub fn dropped(&self) -> usize {
        self.dropped_by_link + self.dropped_by_title
    }
}

struct Retained {
    key: String,
    sector: Option<String>,
}

pub fn deduplicate_with_stats(entries: Vec<Entry>, cfg: &BriefConfig) -> DedupOutcome {
    let threshold = cfg.deduplication.title_similarity_threshold;
    let sector_aware = cfg.deduplication.sector_aware;

    let mut seen_links: HashSet<String> = HashSet::new();
    let mut retained: Vec<Retained> = Vec::new();
    let mut out = DedupOutcome::default();

    for e in entries {
        if !e.link.is_empty() && seen_links.contains(&e.link) {
            out.dropped_by_link += 1;
            continue;
        }

        let key = title_key(&e.title);
        let sector = sector_aware.then(|| sector_label(&e, cfg));
        let duplicate = retained.iter().any(|r| {
            if title_similarity(&key, &r.key) < threshold {
                return false;
            }
            match (&sector, &r.sector) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
        });
        if duplicate {
            out.dropped_by_title += 1;
            continue;
        }

        if !e.link.is_empty() {
            seen_links.insert(e.link.clone());
        }
        retained.push(Retained { key, sector });
        out.kept.push(e);
    }

    out
}

/// Subsequence of `entries` with duplicates removed, first-seen order kept.
pub fn deduplicate(entries: Vec<Entry>, cfg: &BriefConfig) -> Vec<Entry> {
    deduplicate_with_stats(entries, cfg).kept
}
