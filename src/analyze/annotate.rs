// src/analyze/annotate.rs
//! ClassifiedEntry → AnnotatedEntry: event types, sentiment, materiality,
//! risk score, entities, plus the per-entry summary, facts and
//! opportunity details.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyze::classify::risk_hits;
use crate::analyze::terms::{contains_word, count_hits, starts_word};
use crate::analyze::types::{AnnotatedEntry, ClassifiedEntry, Sentiment};
use crate::config::BriefConfig;
use crate::ingest::article::ArticleText;
use crate::sentiment;
use crate::snapshot::stable_id;
use crate::synth::facts::{extract_facts, opportunity_details};
use crate::synth::narrative::why_it_matters;
use crate::synth::summary::summarize;

pub const MAX_EVENT_TYPES: usize = 3;
pub const MAX_ENTITIES: usize = 4;
pub const MAX_FACTS: usize = 3;

/// Event type names, shared with the narrative and executive builders.
pub mod events {
    pub const SANCTIONS: &str = "Sanctions & Compliance";
    pub const GOVERNANCE: &str = "Elections & Governance";
    pub const MACRO: &str = "Macro & Finance";
    pub const ENERGY: &str = "Energy & Oil";
    pub const HUMANITARIAN: &str = "Humanitarian & Social";
    pub const PROCUREMENT: &str = "Procurement & Funding";
    pub const SECURITY: &str = "Security & Conflict";
    pub const TRADE: &str = "Trade & Investment";
}

/// Ordered: earlier rules win ties.
const EVENT_RULES: &[(&str, &[&str])] = &[
    (events::SANCTIONS, &["sanction", "ofac", "embargo", "designation", "general license", "compliance"]),
    (events::GOVERNANCE, &["election", "vote", "opposition", "national assembly", "decree", "cne", "referendum", "amnesty", "regulation"]),
    (events::MACRO, &["inflation", "exchange rate", "bolivar", "debt", "bond", "gdp", "central bank", "reserves", "imf", "budget"]),
    (events::ENERGY, &["oil", "pdvsa", "crude", "refinery", "barrels", "opec", "gas", "chevron", "hydrocarbon"]),
    (events::HUMANITARIAN, &["humanitarian", "migrant", "migration", "refugee", "food insecurity", "health", "hunger", "human rights", "poverty"]),
    (events::PROCUREMENT, &["tender", "procurement", "rfp", "rfq", "grant", "call for proposals", "funding", "bid"]),
    (events::SECURITY, &["arrest", "detained", "protest", "violence", "military", "armed", "attack", "crackdown"]),
    (events::TRADE, &["investment", "export", "import", "trade", "joint venture", "contract", "deal"]),
];

const RISK_EVENTS: &[&str] = &[events::SANCTIONS, events::SECURITY];

fn event_hits(text: &str) -> Vec<(&'static str, usize)> {
    EVENT_RULES
        .iter()
        .map(|(name, keys)| (*name, keys.iter().filter(|k| starts_word(text, k)).count()))
        .collect()
}

/// Up to three event types, most keyword hits first.
pub fn event_types(text: &str) -> Vec<String> {
    let mut hits: Vec<(&str, usize)> = event_hits(text).into_iter().filter(|(_, h)| *h > 0).collect();
    hits.sort_by(|a, b| b.1.cmp(&a.1)); // stable: rule order breaks ties
    hits.into_iter()
        .take(MAX_EVENT_TYPES)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// 1..=5 from keyword density, source tier and score.
pub fn materiality(text: &str, source_weight: f64, score: f64, cfg: &BriefConfig) -> u8 {
    let density = count_hits(text, &cfg.business_signal_terms, cfg)
        + event_hits(text).iter().map(|(_, h)| h).sum::<usize>();
    let mut m = 1 + (density / 2).min(2);
    if source_weight >= 1.3 {
        m += 1;
    }
    if score >= 0.6 {
        m += 1;
    }
    m.clamp(1, 5) as u8
}

/// 0..=100 from risk vocabulary, tone, risk-type events and materiality.
pub fn risk_score(risk_term_hits: usize, sentiment: Sentiment, event_types: &[String], materiality: u8) -> u8 {
    let mut r = (risk_term_hits * 20).min(60);
    if sentiment == Sentiment::Negative {
        r += 15;
    }
    let risk_events = event_types.iter().filter(|e| RISK_EVENTS.contains(&e.as_str())).count();
    r += (risk_events * 10).min(20);
    if materiality >= 4 {
        r += 5;
    }
    r.min(100) as u8
}

static RE_ACRONYM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2,6}\b").expect("acronym regex"));

const ACRONYM_STOPLIST: &[&str] = &[
    "THE", "AND", "FOR", "NEW", "USD", "EUR", "CEO", "GDP", "TV", "AP", "AM", "PM", "US", "UK",
    "BREAKING", "LIVE", "NEWS", "VIDEO", "UPDATE",
];

fn mostly_uppercase(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    !letters.is_empty() && letters.iter().filter(|c| c.is_uppercase()).count() * 2 > letters.len()
}

/// Configured entities first (config order), then stand-alone acronyms.
pub fn entities(raw_text: &str, cfg: &BriefConfig) -> Vec<String> {
    let low = raw_text.to_lowercase();
    let mut out: Vec<String> = Vec::new();

    for p in &cfg.entities {
        let hit = std::iter::once(&p.name)
            .chain(p.aliases.iter())
            .any(|a| contains_word(&low, &a.to_lowercase()));
        if hit && !out.contains(&p.name) {
            out.push(p.name.clone());
        }
    }

    if !mostly_uppercase(raw_text) {
        for m in RE_ACRONYM.find_iter(raw_text) {
            let token = m.as_str();
            if ACRONYM_STOPLIST.contains(&token) {
                continue;
            }
            let known = cfg.entities.iter().any(|p| {
                p.name.eq_ignore_ascii_case(token) || p.aliases.iter().any(|a| a.eq_ignore_ascii_case(token))
            });
            if !known && !out.iter().any(|e| e == token) {
                out.push(token.to_string());
            }
        }
    }

    out.truncate(MAX_ENTITIES);
    out
}

/// Full annotation for one selected entry. `article` is the optional fetched page text.
pub fn annotate(
    classified: ClassifiedEntry,
    article: Option<&ArticleText>,
    cfg: &BriefConfig,
    now: DateTime<Utc>,
) -> AnnotatedEntry {
    let entry = classified.entry();
    let text = entry.text();
    let raw = format!("{} {}", entry.title, entry.summary);

    let event_types = event_types(&text);
    let sentiment = sentiment::classify(&raw);
    let source_weight = cfg.source_weights.weight_for(&entry.source_domain);
    let materiality = materiality(&text, source_weight, classified.score(), cfg);
    let risk_score = risk_score(
        risk_hits(entry, &classified.sector, cfg),
        sentiment,
        &event_types,
        materiality,
    );
    let entities = entities(&raw, cfg);

    let summary = summarize(entry, &classified.sector, article, cfg);
    let why = why_it_matters(&classified.sector, &event_types, classified.flags, cfg);

    let body = article.and_then(|a| a.full_text.as_deref()).unwrap_or_default();
    let facts = extract_facts(&format!("{} {}", summary.text, body), MAX_FACTS);
    let opportunity = if classified.flags.opportunity {
        opportunity_details(&format!("{raw} {body}"), now.date_naive())
    } else {
        None
    };

    tracing::debug!(
        target: "annotate",
        id = %crate::anon_hash(&entry.link),
        events = ?event_types,
        sentiment = sentiment.as_str(),
        materiality,
        risk_score,
        summary_source = summary.source.as_str(),
        "entry annotated"
    );

    AnnotatedEntry {
        stable_id: stable_id(entry),
        event_types,
        sentiment,
        materiality,
        risk_score,
        entities,
        summary_text: summary.text,
        summary_source: summary.source,
        why_it_matters: why,
        facts,
        opportunity,
        classified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::types::{Flags, ScoredEntry};
    use crate::ingest::types::Entry;
    use chrono::TimeZone;

    const CFG: &str = r#"
business_signal_terms = ["contract", "investment"]

[country]
name = "Venezuela"

[flags]
risk_flag_terms = ["sanctions", "arrest"]
opportunity_flag_terms = ["tender"]

[[entities]]
name = "PDVSA"
aliases = ["Petróleos de Venezuela"]

[[entities]]
name = "OFAC"
"#;

    fn classified(title: &str, summary: &str, flags: Flags) -> ClassifiedEntry {
        ClassifiedEntry {
            scored: ScoredEntry {
                entry: Entry {
                    title: title.into(),
                    link: "https://example.com/a".into(),
                    summary: summary.into(),
                    source_domain: "reuters.com".into(),
                    ..Default::default()
                },
                score: 0.7,
            },
            sector: "Cross-cutting / Policy / Risk".into(),
            flags,
        }
    }

    #[test]
    fn event_types_ranked_and_capped() {
        let ev = event_types("ofac sanctions hit pdvsa crude exports as inflation and debt climb; protest in caracas");
        // sanctions, macro and energy tie on two hits each; rule order decides
        assert_eq!(ev, vec![events::SANCTIONS, events::MACRO, events::ENERGY]);
        assert!(event_types("ministry publishes calendar").is_empty());
    }

    #[test]
    fn materiality_and_risk_bounds() {
        let c = BriefConfig::from_toml_str(CFG).unwrap();
        assert_eq!(materiality("", 1.0, 0.0, &c), 1);
        let dense = "contract investment oil crude pdvsa sanctions ofac inflation debt";
        assert_eq!(materiality(dense, 1.4, 0.9, &c), 5);
        assert_eq!(risk_score(0, Sentiment::Neutral, &[], 1), 0);
        let all = vec![events::SANCTIONS.to_string(), events::SECURITY.to_string()];
        assert_eq!(risk_score(10, Sentiment::Negative, &all, 5), 100);
    }

    #[test]
    fn entities_configured_then_acronyms() {
        let c = BriefConfig::from_toml_str(CFG).unwrap();
        let e = entities("Petróleos de Venezuela and the CNE respond to OFAC; the AND party", &c);
        assert_eq!(e, vec!["PDVSA", "OFAC", "CNE"]);
        assert!(entities("VENEZUELA OIL NEWS TODAY", &c).is_empty());
    }

    #[test]
    fn annotate_fills_every_field() {
        let c = BriefConfig::from_toml_str(CFG).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let ce = classified(
            "US sanctions imposed on PDVSA",
            "Washington imposed new sanctions on the state oil company, cutting exports by 20%.",
            Flags { opportunity: false, risk: true },
        );
        let a = annotate(ce, None, &c, now);
        assert_eq!(a.stable_id, "https://example.com/a");
        assert!(a.event_types.contains(&events::SANCTIONS.to_string()));
        assert_eq!(a.sentiment, Sentiment::Negative);
        assert!((1..=5).contains(&a.materiality));
        assert!(a.risk_score > 0 && a.risk_score <= 100);
        assert_eq!(a.entities.first().map(String::as_str), Some("PDVSA"));
        assert!(!a.summary_text.is_empty());
        assert!(!a.why_it_matters.is_empty());
        assert!(a.opportunity.is_none());
        assert!(a.facts.iter().any(|f| f.value == "20%"));
    }
}
