//! Executive rows: one short "what happened / so what" row per theme, built
//! from the best-ranked item of that theme.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyze::annotate::events;
use crate::analyze::types::AnnotatedEntry;
use crate::ingest::normalize::{clean_title, truncate_chars};
use crate::synth::sentences::{
    is_likely_non_english, is_noisy_text, looks_like_title_fragment, split_sentences,
};
use crate::synth::summary::{pick, SummarySource};

pub const MAX_ROWS: usize = 6;
const MAX_SENTENCE_CHARS: usize = 210;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Sanctions,
    Governance,
    Macro,
    Energy,
    Social,
    Opportunity,
}

pub const THEME_ORDER: [Theme; 6] = [
    Theme::Sanctions,
    Theme::Governance,
    Theme::Macro,
    Theme::Energy,
    Theme::Social,
    Theme::Opportunity,
];

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Sanctions => "sanctions",
            Theme::Governance => "governance",
            Theme::Macro => "macro",
            Theme::Energy => "energy",
            Theme::Social => "social",
            Theme::Opportunity => "opportunity",
        }
    }

    fn snappy(&self) -> &'static [&'static str] {
        match self {
            Theme::Sanctions => &["Compliance risk just re-priced", "Sanctions posture shifted", "Licensing risk moved"],
            Theme::Governance => &["Regulatory signal spiked", "Policy continuity risk rose", "Governance calculus shifted"],
            Theme::Macro => &["Macro assumptions moved", "FX and inflation risk reset", "Pricing assumptions under pressure"],
            Theme::Energy => &["Oil contracting environment shifted", "PDVSA contracting signal changed", "Energy execution risk moved"],
            Theme::Social => &["Humanitarian pressure persists", "Delivery constraints increased", "Social exposure remains elevated"],
            Theme::Opportunity => &["Live funding and tender signals moved", "Procurement window shifted", "Bid pipeline emerged"],
        }
    }

    fn so_what(&self) -> &'static str {
        match self {
            Theme::Sanctions => "This shapes counterparty risk and deal feasibility, especially for state-linked exposure.",
            Theme::Governance => "This raises policy discontinuity risk and weakens enforcement predictability for operators.",
            Theme::Macro => "This flows through to FX, inflation expectations and near-term operating assumptions.",
            Theme::Energy => "Licensing pathways and compliance screens now decide who can transact and at what margin.",
            Theme::Social => "This raises reputational, duty-of-care and partner screening requirements for any field footprint.",
            Theme::Opportunity => "This opens near-term entry points, but qualification and partner diligence remain critical.",
        }
    }

    /// English stand-in when the item's own text is unusable.
    fn english_event(&self) -> &'static str {
        match self {
            Theme::Sanctions => "Authorities and counterparties signaled a shift in sanctions-related operating conditions",
            Theme::Governance => "Political actors triggered an institutional change with policy execution implications",
            Theme::Macro => "Market and political signals shifted near-term assumptions for inflation, FX and stability",
            Theme::Energy => "Energy-side actors signaled a contracting and licensing shift in oil market access",
            Theme::Social => "Humanitarian and rights-related signals point to sustained pressure on delivery conditions",
            Theme::Opportunity => "Commercial and funding signals point to near-term openings with higher qualification scrutiny",
        }
    }
}

fn sector_phrase(sector: &str) -> String {
    match sector.to_lowercase().as_str() {
        "" => "priority operating channels".into(),
        "cross-cutting / policy / risk" => "policy and institutional channels".into(),
        "extractives & mining" => "energy and extractives channels".into(),
        "finance & investment" => "capital and market channels".into(),
        "food & agriculture" => "food system channels".into(),
        "health & water" => "public service channels".into(),
        "education & workforce" => "labor and human capital channels".into(),
        other => other.to_string(),
    }
}

const THEME_KEYWORDS: [(Theme, &[&str]); 6] = [
    (Theme::Sanctions, &["sanction", "ofac", "license", "compliance", "designation"]),
    (Theme::Governance, &["election", "opposition", "assembly", "cne", "decree", "regulation", "resigned", "ombudsman"]),
    (Theme::Macro, &["inflation", "exchange rate", "debt", "bond", "reserves", "gdp", "budget"]),
    (Theme::Energy, &["oil", "pdvsa", "refinery", "crude", "opec", "hydrocarbon"]),
    (Theme::Social, &["food", "health", "water", "migration", "migrants", "school", "poverty", "humanitarian", "human rights"]),
    (Theme::Opportunity, &["tender", "procurement", "rfp", "rfq", "grant", "eoi", "bid"]),
];

/// Theme from the entry's event types first, then keywords, then flags.
pub fn infer_theme(item: &AnnotatedEntry) -> Theme {
    for ev in &item.event_types {
        let theme = match ev.as_str() {
            events::SANCTIONS => Some(Theme::Sanctions),
            events::GOVERNANCE => Some(Theme::Governance),
            events::MACRO => Some(Theme::Macro),
            events::ENERGY => Some(Theme::Energy),
            events::HUMANITARIAN => Some(Theme::Social),
            events::PROCUREMENT => Some(Theme::Opportunity),
            _ => None,
        };
        if let Some(t) = theme {
            return t;
        }
    }

    let low = format!("{} {}", item.entry().title, item.summary_text).to_lowercase();
    for (theme, keys) in THEME_KEYWORDS.iter() {
        if keys.iter().any(|k| low.contains(k)) {
            return *theme;
        }
    }
    if item.flags().opportunity {
        Theme::Opportunity
    } else {
        Theme::Macro
    }
}

pub fn pick_snappy(theme: Theme, seed: &str) -> &'static str {
    pick(seed, theme.snappy()).copied().unwrap_or("Key development")
}

/// "[Actors: ]what happened. So what."
pub fn build_sentence(item: &AnnotatedEntry, theme: Theme) -> String {
    let title = clean_title(&item.entry().title);
    let mut core = if item.summary_source == SummarySource::Fallback {
        String::new()
    } else {
        split_sentences(&item.summary_text).into_iter().next().unwrap_or_default()
    };
    if is_noisy_text(&core) && title.chars().count() >= 30 {
        core = title;
    }
    if is_noisy_text(&core) || is_likely_non_english(&core) || looks_like_title_fragment(&core) {
        core = format!("{} in {}", theme.english_event(), sector_phrase(item.sector()));
    }

    let happened = truncate_chars(core.trim_end_matches(['.', ' ']), MAX_SENTENCE_CHARS);
    let actors = if item.entities.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = item.entities.iter().take(2).map(String::as_str).collect();
        format!("{}: ", names.join(", "))
    };
    format!("{actors}{happened}. {}", theme.so_what())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecRow {
    pub subheading: String,
    pub sentence: String,
    pub theme: Theme,
    pub published_at: Option<DateTime<Utc>>,
}

/// At most one row per theme, in theme order. `selected` is in rank order,
/// so the first item of each theme is its best.
pub fn exec_rows(selected: &[AnnotatedEntry]) -> Vec<ExecRow> {
    let themed: Vec<(Theme, &AnnotatedEntry)> = selected.iter().map(|e| (infer_theme(e), e)).collect();

    THEME_ORDER
        .iter()
        .filter_map(|theme| {
            let (_, top) = themed.iter().find(|(t, _)| t == theme)?;
            Some(ExecRow {
                subheading: pick_snappy(*theme, &top.entry().title).to_string(),
                sentence: build_sentence(top, *theme),
                theme: *theme,
                published_at: top.entry().published_at,
            })
        })
        .take(MAX_ROWS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snappy_is_deterministic() {
        let a = pick_snappy(Theme::Energy, "PDVSA signs supply deal");
        assert_eq!(a, pick_snappy(Theme::Energy, "PDVSA signs supply deal"));
        assert!(Theme::Energy.snappy().contains(&a));
    }

    #[test]
    fn sector_phrases() {
        assert_eq!(sector_phrase("Extractives & Mining"), "energy and extractives channels");
        assert_eq!(sector_phrase("Tourism"), "tourism");
        assert_eq!(sector_phrase(""), "priority operating channels");
    }
}
