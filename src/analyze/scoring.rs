//! Relevance scoring.
//!
//! Five sub-scores in [0,1], combined with the configured weights:
//! - `country`  : country + geo-context term hits, saturating at a fraction of the country vocabulary
//! - `sector`   : best per-sector include-term score, plus a bonus per extra matched sector
//! - `business` : business-signal term hits
//! - `recency`  : linear decay to zero at the entry's age horizon; undated → constant
//! - `source`   : source-priority weight above neutral
//!
//! Final score = weighted sum, clamped to [0,1], rounded to 4 decimals.
//! Pure function of (entry, config, now).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyze::classify::{sector_hit_counts, sector_label};
use crate::analyze::terms::count_hits;
use crate::analyze::types::ScoredEntry;
use crate::config::BriefConfig;
use crate::ingest::types::Entry;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub country: f64,
    pub sector: f64,
    pub business: f64,
    pub recency: f64,
    pub source: f64,
    pub total: f64,
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// `hits / max(1, vocabulary * saturation)`, clamped.
fn saturating(hits: usize, vocabulary: usize, saturation: f64) -> f64 {
    let denom = (vocabulary as f64 * saturation).max(1.0);
    clamp01(hits as f64 / denom)
}

/// Age in fractional days; future timestamps count as zero.
pub fn age_days(published_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    ((now - published_at).num_seconds() as f64 / 86_400.0).max(0.0)
}

pub fn score_breakdown(entry: &Entry, cfg: &BriefConfig, now: DateTime<Utc>) -> ScoreBreakdown {
    let sc = &cfg.scoring;
    let text = entry.text();

    let country_hits = count_hits(&text, &cfg.country.country_terms, cfg)
        + count_hits(&text, &cfg.country.geo_context_terms, cfg);
    let country = saturating(
        country_hits,
        cfg.country.country_terms.len(),
        sc.country_saturation,
    );

    let per_sector: Vec<f64> = sector_hit_counts(&text, cfg)
        .into_iter()
        .zip(&cfg.sectors)
        .map(|(hits, s)| saturating(hits, s.include.len(), sc.sector_saturation))
        .collect();
    let matched = per_sector.iter().filter(|s| **s > 0.0).count();
    let top = per_sector.iter().copied().fold(0.0, f64::max);
    let sector = if matched > 1 {
        clamp01(top + sc.multi_sector_bonus * (matched - 1) as f64)
    } else {
        top
    };

    let business = saturating(
        count_hits(&text, &cfg.business_signal_terms, cfg),
        cfg.business_signal_terms.len(),
        sc.business_saturation,
    );

    let recency = match entry.published_at {
        None => clamp01(sc.undated_recency),
        Some(ts) => {
            let horizon = cfg.max_age_for(&sector_label(entry, cfg)).max(1) as f64;
            clamp01(1.0 - age_days(ts, now) / horizon)
        }
    };

    let source = cfg
        .source_weights
        .priority_score(&entry.source_domain, sc.source_weight_span);

    let w = &sc.weights;
    let raw = w.country_match * country
        + w.sector_relevance * sector
        + w.business_signals * business
        + w.recency * recency
        + w.source_priority * source;

    ScoreBreakdown {
        country,
        sector,
        business,
        recency,
        source,
        total: round4(clamp01(raw)),
    }
}

/// Composite relevance score in [0,1].
pub fn score(entry: &Entry, cfg: &BriefConfig, now: DateTime<Utc>) -> f64 {
    score_breakdown(entry, cfg, now).total
}

/// Score and sort by score descending; equal scores keep input order.
pub fn rank(entries: Vec<Entry>, cfg: &BriefConfig, now: DateTime<Utc>) -> Vec<ScoredEntry> {
    let mut scored: Vec<ScoredEntry> = entries
        .into_iter()
        .map(|entry| {
            let b = score_breakdown(&entry, cfg, now);
            tracing::debug!(
                target: "scoring",
                id = %crate::anon_hash(&entry.title),
                total = b.total,
                country = b.country,
                sector = b.sector,
                business = b.business,
                recency = b.recency,
                source = b.source,
            );
            ScoredEntry {
                entry,
                score: b.total,
            }
        })
        .collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const CFG: &str = r#"
business_signal_terms = ["tender", "procurement"]

[country]
name = "Venezuela"
country_terms = ["venezuela", "caracas"]
geo_context_terms = ["caribbean"]
max_age_days = 7

[[sectors]]
key = "energy"
label = "Extractives & Mining"
include = ["oil", "gas", "pdvsa", "crude", "refinery", "opec", "barrels"]

[[sectors]]
key = "finance"
label = "Finance & Investment"
include = ["bond", "debt", "sanctions", "inflation", "imf", "reserves", "creditors"]
max_age_days = 14

[[source_weights]]
domain = "worldbank.org"
weight = 1.4
"#;

    fn cfg() -> BriefConfig {
        BriefConfig::from_toml_str(CFG).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 20, 12, 0, 0).unwrap()
    }

    fn entry(title: &str) -> Entry {
        Entry {
            title: title.into(),
            ..Default::default()
        }
    }

    #[test]
    fn undated_gets_neutral_recency() {
        let b = score_breakdown(&entry("x"), &cfg(), now());
        assert!((b.recency - 0.5).abs() < 1e-9);
    }

    #[test]
    fn recency_decays_linearly() {
        let c = cfg();
        let mut e = entry("Venezuela oil");
        e.published_at = Some(now() - Duration::hours(84)); // 3.5 days of 7
        assert!((score_breakdown(&e, &c, now()).recency - 0.5).abs() < 1e-9);
        e.published_at = Some(now() - Duration::days(30));
        assert_eq!(score_breakdown(&e, &c, now()).recency, 0.0);
        e.published_at = Some(now() + Duration::days(2));
        assert_eq!(score_breakdown(&e, &c, now()).recency, 1.0);
    }

    #[test]
    fn sector_max_age_override_stretches_decay() {
        let c = cfg();
        let mut e = entry("Bond debt talks");
        e.published_at = Some(now() - Duration::days(7));
        assert!((score_breakdown(&e, &c, now()).recency - 0.5).abs() < 1e-9);
    }

    #[test]
    fn multi_sector_bonus_applies() {
        let c = cfg();
        // 7 terms * 0.3 = 2.1 hits saturate
        let one = score_breakdown(&entry("oil"), &c, now()).sector;
        assert!((one - 1.0 / 2.1).abs() < 1e-9);
        let two = score_breakdown(&entry("oil bond"), &c, now()).sector;
        assert!((two - (1.0 / 2.1 + 0.10)).abs() < 1e-9);
        let full = score_breakdown(&entry("oil gas crude bond"), &c, now()).sector;
        assert_eq!(full, 1.0);
    }

    #[test]
    fn country_counts_geo_terms() {
        let b = score_breakdown(&entry("Caribbean shipping lanes"), &cfg(), now());
        assert!((b.country - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_total_matches_components() {
        let c = cfg();
        let mut e = entry("Venezuela oil tender");
        e.published_at = Some(now() - Duration::days(1));
        e.source_domain = "worldbank.org".into();
        let b = score_breakdown(&e, &c, now());
        let expected = 0.20 * b.country
            + 0.30 * b.sector
            + 0.25 * b.business
            + 0.15 * b.recency
            + 0.10 * b.source;
        assert!((b.total - (expected.min(1.0) * 10_000.0).round() / 10_000.0).abs() < 1e-12);
        assert!((b.source - 0.8).abs() < 1e-9);
    }

    #[test]
    fn rank_is_stable_on_ties() {
        let c = cfg();
        let entries = vec![entry("a"), entry("Venezuela oil"), entry("b")];
        let ranked = rank(entries, &c, now());
        let titles: Vec<&str> = ranked.iter().map(|s| s.entry.title.as_str()).collect();
        assert_eq!(titles, vec!["Venezuela oil", "a", "b"]);
    }
}
