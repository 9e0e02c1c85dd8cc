//! Sector classification and opportunity/risk flags.
//!
//! Every entry gets exactly one sector label: a source-URL hint wins, then
//! the sector with the most include-term hits (config order breaks ties),
//! then the catch-all default label.

use serde::Serialize;

use crate::analyze::terms::{any_hit, count_hits};
use crate::analyze::types::{ClassifiedEntry, Flags, ScoredEntry};
use crate::config::BriefConfig;
use crate::ingest::types::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassificationBasis {
    SourceHint,
    Terms,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorMatch {
    pub key: Option<String>,
    pub label: String,
    pub basis: ClassificationBasis,
    pub hits: usize,
}

/// Include-term hits per configured sector, in config order.
pub fn sector_hit_counts(text: &str, cfg: &BriefConfig) -> Vec<usize> {
    cfg.sectors
        .iter()
        .map(|s| count_hits(text, &s.include, cfg))
        .collect()
}

/// Feed URLs are often search queries; treat `+` and `%20` as spaces.
fn hint_haystack(source_url: &str) -> String {
    source_url
        .to_lowercase()
        .replace("%20", " ")
        .replace('+', " ")
}

pub fn classify(entry: &Entry, cfg: &BriefConfig) -> SectorMatch {
    let url = hint_haystack(&entry.source_url);
    if !url.is_empty() {
        for s in &cfg.sectors {
            if s.source_hints.iter().any(|h| url.contains(h.as_str())) {
                return SectorMatch {
                    key: Some(s.key.clone()),
                    label: s.label.clone(),
                    basis: ClassificationBasis::SourceHint,
                    hits: 0,
                };
            }
        }
    }

    let text = entry.text();
    let mut best: Option<(usize, usize)> = None; // (sector index, hits)
    for (i, hits) in sector_hit_counts(&text, cfg).into_iter().enumerate() {
        // strict > keeps the first sector reaching the max
        if hits > 0 && best.map_or(true, |(_, h)| hits > h) {
            best = Some((i, hits));
        }
    }

    match best {
        Some((i, hits)) => SectorMatch {
            key: Some(cfg.sectors[i].key.clone()),
            label: cfg.sectors[i].label.clone(),
            basis: ClassificationBasis::Terms,
            hits,
        },
        None => SectorMatch {
            key: None,
            label: cfg.default_sector_label.clone(),
            basis: ClassificationBasis::Default,
            hits: 0,
        },
    }
}

/// Label only; never empty.
pub fn sector_label(entry: &Entry, cfg: &BriefConfig) -> String {
    classify(entry, cfg).label
}

/// Independent flags. Global flag terms apply to every entry; a sector's own
/// opportunity/risk terms apply to entries classified into it.
pub fn detect_flags(entry: &Entry, sector_label: &str, cfg: &BriefConfig) -> Flags {
    let text = entry.text();
    let sector = cfg.sector_by_label(sector_label);

    let opportunity = any_hit(&text, &cfg.flags.opportunity_flag_terms, cfg)
        || sector.is_some_and(|s| any_hit(&text, &s.opportunity_terms, cfg));
    let risk = any_hit(&text, &cfg.flags.risk_flag_terms, cfg)
        || sector.is_some_and(|s| any_hit(&text, &s.risk_terms, cfg));

    Flags { opportunity, risk }
}

/// Risk vocabulary hits (global plus the entry's sector), used by risk scoring.
pub fn risk_hits(entry: &Entry, sector_label: &str, cfg: &BriefConfig) -> usize {
    let text = entry.text();
    let sector_hits = cfg
        .sector_by_label(sector_label)
        .map_or(0, |s| count_hits(&text, &s.risk_terms, cfg));
    count_hits(&text, &cfg.flags.risk_flag_terms, cfg) + sector_hits
}

pub fn classify_entry(scored: ScoredEntry, cfg: &BriefConfig) -> ClassifiedEntry {
    let sector = sector_label(&scored.entry, cfg);
    let flags = detect_flags(&scored.entry, &sector, cfg);
    ClassifiedEntry {
        scored,
        sector,
        flags,
    }
}
