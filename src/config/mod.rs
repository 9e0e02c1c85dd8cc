// src/config/mod.rs
//! Run configuration: country vocabulary, sectors, scoring weights, selection
//! quotas and summary settings. Built once per run and passed by reference.

pub mod feeds;

use anyhow::Context;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::source_weights::SourceWeightsConfig;

// --- env defaults & names ---
pub const DEFAULT_BRIEF_CONFIG_PATH: &str = "config/brief.toml";
pub const ENV_BRIEF_CONFIG_PATH: &str = "BRIEF_CONFIG_PATH";
pub const ENV_DEDUP_THRESHOLD: &str = "BRIEF_DEDUP_THRESHOLD";

pub const DEFAULT_SECTOR_LABEL: &str = "Cross-cutting / Policy / Risk";
pub const DEFAULT_DEDUP_THRESHOLD: f64 = 0.90;

static EMBEDDED: Lazy<BriefConfig> = Lazy::new(|| {
    let raw = include_str!("../../config/brief.toml");
    BriefConfig::from_toml_str(raw).expect("valid embedded brief config")
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefConfig {
    pub country: CountryConfig,
    /// Ordered; tie-breaks and section defaults follow this order.
    #[serde(default)]
    pub sectors: Vec<SectorConfig>,
    #[serde(default)]
    pub business_signal_terms: Vec<String>,
    /// Short terms matched on word boundaries instead of as substrings.
    #[serde(default = "default_acronym_terms")]
    pub acronym_terms: Vec<String>,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default = "SourceWeightsConfig::default_seed")]
    pub source_weights: SourceWeightsConfig,
    #[serde(default)]
    pub deduplication: DedupConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub flags: FlagsConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub entities: Vec<EntityPattern>,
    #[serde(default = "default_sector_label")]
    pub default_sector_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryConfig {
    pub name: String,
    #[serde(default)]
    pub country_terms: Vec<String>,
    #[serde(default)]
    pub geo_context_terms: Vec<String>,
    #[serde(default)]
    pub exclude_terms: Vec<String>,
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,
    #[serde(default = "default_true")]
    pub require_country_match: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorConfig {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub include: Vec<String>,
    /// Keywords checked against the feed URL before any text voting.
    #[serde(default)]
    pub source_hints: Vec<String>,
    /// Extra flag vocabulary for entries classified into this sector.
    #[serde(default, alias = "opportunity")]
    pub opportunity_terms: Vec<String>,
    #[serde(default, alias = "risk")]
    pub risk_terms: Vec<String>,
    #[serde(default)]
    pub max_age_days: Option<i64>,
    #[serde(default)]
    pub min_selected: Option<usize>,
    #[serde(default)]
    pub max_selected: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub country_match: f64,
    pub sector_relevance: f64,
    pub business_signals: f64,
    pub recency: f64,
    pub source_priority: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            country_match: 0.20,
            sector_relevance: 0.30,
            business_signals: 0.25,
            recency: 0.15,
            source_priority: 0.10,
        }
    }
}

/// Weights plus the saturation constants that turn raw hit counts into
/// sub-scores. The constants are tuned to the term-list sizes in use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub multi_sector_bonus: f64,
    /// Fraction of the country vocabulary that saturates the country sub-score.
    pub country_saturation: f64,
    pub sector_saturation: f64,
    pub business_saturation: f64,
    pub undated_recency: f64,
    /// Weight above neutral at which the source sub-score saturates.
    pub source_weight_span: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            multi_sector_bonus: 0.10,
            country_saturation: 0.2,
            sector_saturation: 0.3,
            business_saturation: 0.1,
            undated_recency: 0.5,
            source_weight_span: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub title_similarity_threshold: f64,
    pub sector_aware: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            title_similarity_threshold: DEFAULT_DEDUP_THRESHOLD,
            sector_aware: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub max_results: usize,
    pub min_per_section: usize,
    pub max_per_section: usize,
    /// Section labels in display order. Empty means sector order plus the
    /// default label.
    pub sections: Vec<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_results: 35,
            min_per_section: 2,
            max_per_section: 8,
            sections: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagsConfig {
    pub opportunity_flag_terms: Vec<String>,
    pub risk_flag_terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub max_chars: usize,
    /// Candidate sentences at or above this title similarity are skipped.
    pub title_similarity_threshold: f64,
    pub min_sentence_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_chars: 280,
            title_similarity_threshold: 0.80,
            min_sentence_chars: 35,
        }
    }
}

/// Named actor with the surface forms that identify it in text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPattern {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

fn default_acronym_terms() -> Vec<String> {
    ["rfp", "rfi", "rfq", "itb", "eoi", "tor", "cfp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_sector_label() -> String {
    DEFAULT_SECTOR_LABEL.to_string()
}

fn default_max_age_days() -> i64 {
    7
}

fn default_true() -> bool {
    true
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

impl BriefConfig {
    /// Load from `BRIEF_CONFIG_PATH` (or `config/brief.toml`), then apply env overrides.
    pub fn from_toml() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_BRIEF_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_BRIEF_CONFIG_PATH));
        Self::from_toml_path(&path)
    }

    pub fn from_toml_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read brief config at {}", path.display()))?;

        let mut cfg = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse brief config at {}", path.display()))?;

        if let Some(t) = parse_threshold_env(std::env::var(ENV_DEDUP_THRESHOLD).ok()) {
            cfg.deduplication.title_similarity_threshold = t;
        }

        Ok(cfg)
    }

    /// Load from a TOML string. No env overrides.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: BriefConfig = toml::from_str(toml_str)?;
        cfg.sanitize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Venezuela configuration compiled into the binary.
    pub fn embedded() -> Self {
        EMBEDDED.clone()
    }

    /// Lowercase/trim every term list and pull numbers back into range.
    fn sanitize(&mut self) {
        let c = &mut self.country;
        clean_terms(&mut c.country_terms);
        clean_terms(&mut c.geo_context_terms);
        clean_terms(&mut c.exclude_terms);
        c.max_age_days = c.max_age_days.max(1);

        for s in &mut self.sectors {
            clean_terms(&mut s.include);
            clean_terms(&mut s.source_hints);
            clean_terms(&mut s.opportunity_terms);
            clean_terms(&mut s.risk_terms);
            s.max_age_days = s.max_age_days.map(|d| d.max(1));
        }
        clean_terms(&mut self.business_signal_terms);
        clean_terms(&mut self.acronym_terms);
        clean_terms(&mut self.flags.opportunity_flag_terms);
        clean_terms(&mut self.flags.risk_flag_terms);

        let w = &mut self.scoring.weights;
        for v in [
            &mut w.country_match,
            &mut w.sector_relevance,
            &mut w.business_signals,
            &mut w.recency,
            &mut w.source_priority,
        ] {
            *v = non_negative(*v, 0.0);
        }
        let s = &mut self.scoring;
        s.multi_sector_bonus = non_negative(s.multi_sector_bonus, 0.10);
        s.country_saturation = positive(s.country_saturation, 0.2);
        s.sector_saturation = positive(s.sector_saturation, 0.3);
        s.business_saturation = positive(s.business_saturation, 0.1);
        s.undated_recency = non_negative(s.undated_recency, 0.5).min(1.0);
        s.source_weight_span = positive(s.source_weight_span, 0.5);

        let d = &mut self.deduplication;
        d.title_similarity_threshold = if d.title_similarity_threshold.is_finite() {
            d.title_similarity_threshold.clamp(0.0, 1.0)
        } else {
            DEFAULT_DEDUP_THRESHOLD
        };

        let sum = &mut self.summary;
        sum.max_chars = sum.max_chars.max(40);
        sum.title_similarity_threshold = if sum.title_similarity_threshold.is_finite() {
            sum.title_similarity_threshold.clamp(0.0, 1.0)
        } else {
            0.80
        };

        if self.default_sector_label.trim().is_empty() {
            self.default_sector_label = default_sector_label();
        }
        self.selection.sections.retain(|s| !s.trim().is_empty());
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.country.name.trim().is_empty() {
            anyhow::bail!("country.name must not be empty");
        }
        let mut keys = std::collections::HashSet::new();
        for s in &self.sectors {
            if s.key.trim().is_empty() || s.label.trim().is_empty() {
                anyhow::bail!("every sector needs a key and a label");
            }
            if !keys.insert(s.key.as_str()) {
                anyhow::bail!("duplicate sector key `{}`", s.key);
            }
        }
        Ok(())
    }

    /// Country and geo-context terms together.
    pub fn country_vocabulary(&self) -> impl Iterator<Item = &str> {
        self.country
            .country_terms
            .iter()
            .chain(self.country.geo_context_terms.iter())
            .map(String::as_str)
    }

    pub fn sector_by_label(&self, label: &str) -> Option<&SectorConfig> {
        self.sectors.iter().find(|s| s.label == label)
    }

    /// Age horizon for an entry classified into `label`.
    pub fn max_age_for(&self, label: &str) -> i64 {
        self.sector_by_label(label)
            .and_then(|s| s.max_age_days)
            .unwrap_or(self.country.max_age_days)
    }

    /// Section labels in display order.
    pub fn section_order(&self) -> Vec<String> {
        if !self.selection.sections.is_empty() {
            return self.selection.sections.clone();
        }
        let mut out: Vec<String> = self.sectors.iter().map(|s| s.label.clone()).collect();
        if !out.contains(&self.default_sector_label) {
            out.push(self.default_sector_label.clone());
        }
        out
    }

    pub fn min_for_section(&self, label: &str) -> usize {
        self.sector_by_label(label)
            .and_then(|s| s.min_selected)
            .unwrap_or(self.selection.min_per_section)
    }

    pub fn max_for_section(&self, label: &str) -> usize {
        self.sector_by_label(label)
            .and_then(|s| s.max_selected)
            .unwrap_or(self.selection.max_per_section)
    }
}

fn clean_terms(terms: &mut Vec<String>) {
    let mut out: Vec<String> = Vec::with_capacity(terms.len());
    for t in terms.drain(..) {
        let t = t.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    *terms = out;
}

fn non_negative(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        fallback
    }
}

fn positive(v: f64, fallback: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[country]
name = "Venezuela"
country_terms = ["Venezuela", " Caracas ", "venezuela"]

[[sectors]]
key = "energy"
label = "Extractives & Mining"
include = ["Oil", "PDVSA"]
max_age_days = 14

[[sectors]]
key = "finance"
label = "Finance & Investment"
include = ["bond"]
max_selected = 3
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = BriefConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(cfg.country.country_terms, vec!["venezuela", "caracas"]);
        assert_eq!(cfg.country.max_age_days, 7);
        assert!(cfg.country.require_country_match);
        assert_eq!(cfg.sectors[0].include, vec!["oil", "pdvsa"]);
        assert!((cfg.scoring.weights.sector_relevance - 0.30).abs() < 1e-9);
        assert_eq!(cfg.selection.max_results, 35);
        assert_eq!(cfg.default_sector_label, DEFAULT_SECTOR_LABEL);
        assert!(cfg.acronym_terms.contains(&"tor".to_string()));
    }

    #[test]
    fn per_sector_overrides() {
        let cfg = BriefConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(cfg.max_age_for("Extractives & Mining"), 14);
        assert_eq!(cfg.max_age_for("Finance & Investment"), 7);
        assert_eq!(cfg.max_age_for(DEFAULT_SECTOR_LABEL), 7);
        assert_eq!(cfg.max_for_section("Finance & Investment"), 3);
        assert_eq!(cfg.max_for_section("Extractives & Mining"), 8);
    }

    #[test]
    fn section_order_defaults_to_sectors_plus_catch_all() {
        let cfg = BriefConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(
            cfg.section_order(),
            vec![
                "Extractives & Mining".to_string(),
                "Finance & Investment".to_string(),
                DEFAULT_SECTOR_LABEL.to_string(),
            ]
        );
    }

    #[test]
    fn duplicate_sector_keys_rejected() {
        let bad = r#"
[country]
name = "X"
[[sectors]]
key = "a"
label = "A"
[[sectors]]
key = "a"
label = "B"
"#;
        assert!(BriefConfig::from_toml_str(bad).is_err());
    }

    #[test]
    fn threshold_env_is_clamped() {
        assert_eq!(parse_threshold_env(Some("1.7".into())), Some(1.0));
        assert_eq!(parse_threshold_env(Some(" 0.85 ".into())), Some(0.85));
        assert_eq!(parse_threshold_env(Some("abc".into())), None);
        assert_eq!(parse_threshold_env(Some("NaN".into())), None);
        assert_eq!(parse_threshold_env(None), None);
    }

    #[test]
    fn embedded_config_parses() {
        let cfg = BriefConfig::embedded();
        assert_eq!(cfg.country.name, "Venezuela");
        assert!(!cfg.sectors.is_empty());
        assert!(!cfg.flags.risk_flag_terms.is_empty());
    }
}
