//! Diverse top-N selection.
//!
//! 1. Guarantee: per section (display order), the best `min` entries of that sector.
//! 2. Fill: ranked order, skipping sectors at their cap.
//! 3. Backfill: ranked order, caps ignored, until full.
//!
//! Output is returned in ranked order. Caps only give way in pass 3.

use std::collections::{HashMap, HashSet};

use crate::analyze::dedup::title_key;
use crate::analyze::types::ClassifiedEntry;
use crate::config::BriefConfig;

fn identity_key(e: &ClassifiedEntry) -> String {
    format!("{}|{}", e.entry().link, title_key(&e.entry().title))
}

#[derive(Debug, Default)]
struct Picks {
    taken: Vec<usize>, // indices into the ranked slice
    keys: HashSet<String>,
    per_sector: HashMap<String, usize>,
}

impl Picks {
    fn take(&mut self, idx: usize, e: &ClassifiedEntry) -> bool {
        if !self.keys.insert(identity_key(e)) {
            return false;
        }
        self.taken.push(idx);
        *self.per_sector.entry(e.sector.clone()).or_default() += 1;
        true
    }

    fn has(&self, e: &ClassifiedEntry) -> bool {
        self.keys.contains(&identity_key(e))
    }

    fn count(&self, sector: &str) -> usize {
        self.per_sector.get(sector).copied().unwrap_or(0)
    }
}

/// Pick at most `max_results` entries from a score-ranked list.
pub fn select(ranked: &[ClassifiedEntry], cfg: &BriefConfig, max_results: usize) -> Vec<ClassifiedEntry> {
    let mut picks = Picks::default();

    // 1) guarantee
    for section in cfg.section_order() {
        let quota = cfg.min_for_section(&section).min(cfg.max_for_section(&section));
        let mut got = 0;
        for (i, e) in ranked.iter().enumerate() {
            if got >= quota || picks.taken.len() >= max_results {
                break;
            }
            if e.sector == section && picks.take(i, e) {
                got += 1;
            }
        }
    }

    // 2) fill under caps
    for (i, e) in ranked.iter().enumerate() {
        if picks.taken.len() >= max_results {
            break;
        }
        if picks.has(e) || picks.count(&e.sector) >= cfg.max_for_section(&e.sector) {
            continue;
        }
        picks.take(i, e);
    }

    // 3) backfill, caps off
    let before_backfill = picks.taken.len();
    for (i, e) in ranked.iter().enumerate() {
        if picks.taken.len() >= max_results {
            break;
        }
        picks.take(i, e);
    }
    if picks.taken.len() > before_backfill {
        tracing::debug!(
            target: "select",
            backfilled = picks.taken.len() - before_backfill,
            "section caps relaxed to reach max_results"
        );
    }

    picks.taken.sort_unstable();
    picks.taken.into_iter().map(|i| ranked[i].clone()).collect()
}

/// `select` with the configured `max_results`.
pub fn select_top(ranked: &[ClassifiedEntry], cfg: &BriefConfig) -> Vec<ClassifiedEntry> {
    select(ranked, cfg, cfg.selection.max_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::types::{Flags, ScoredEntry};
    use crate::ingest::types::Entry;

    const CFG: &str = r#"
[country]
name = "Venezuela"

[[sectors]]
key = "a"
label = "A"

[[sectors]]
key = "b"
label = "B"

[selection]
min_per_section = 1
max_per_section = 2
"#;

    fn ce(title: &str, sector: &str, score: f64) -> ClassifiedEntry {
        ClassifiedEntry {
            scored: ScoredEntry {
                entry: Entry {
                    title: title.into(),
                    link: format!("https://x/{title}"),
                    ..Default::default()
                },
                score,
            },
            sector: sector.into(),
            flags: Flags::default(),
        }
    }

    fn titles(v: &[ClassifiedEntry]) -> Vec<&str> {
        v.iter().map(|e| e.entry().title.as_str()).collect()
    }

    #[test]
    fn guarantee_pulls_in_low_ranked_sector() {
        let c = BriefConfig::from_toml_str(CFG).unwrap();
        let ranked = vec![ce("a1", "A", 0.9), ce("a2", "A", 0.8), ce("a3", "A", 0.7), ce("b1", "B", 0.1)];
        let out = select(&ranked, &c, 3);
        assert_eq!(titles(&out), vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn caps_hold_until_backfill_needed() {
        let c = BriefConfig::from_toml_str(CFG).unwrap();
        let ranked = vec![ce("a1", "A", 0.9), ce("a2", "A", 0.8), ce("a3", "A", 0.7), ce("b1", "B", 0.1)];
        // 4 slots: caps allow only a1, a2, b1, so a3 arrives via backfill
        let out = select(&ranked, &c, 4);
        assert_eq!(out.len(), 4);
        assert_eq!(titles(&out), vec!["a1", "a2", "a3", "b1"]);
    }

    #[test]
    fn no_duplicates_and_size_bound() {
        let c = BriefConfig::from_toml_str(CFG).unwrap();
        let ranked = vec![ce("a1", "A", 0.9), ce("a1", "A", 0.9), ce("b1", "B", 0.5)];
        let out = select(&ranked, &c, 10);
        assert_eq!(titles(&out), vec!["a1", "b1"]);
        assert!(select(&ranked, &c, 0).is_empty());
    }

    #[test]
    fn unknown_sectors_use_default_cap() {
        let c = BriefConfig::from_toml_str(CFG).unwrap();
        let ranked = vec![ce("z1", "Z", 0.9), ce("z2", "Z", 0.8), ce("z3", "Z", 0.7), ce("a1", "A", 0.1)];
        let out = select(&ranked, &c, 3);
        assert_eq!(titles(&out), vec!["z1", "z2", "a1"]);
    }
}
