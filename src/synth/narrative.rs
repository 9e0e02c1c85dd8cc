//! Set-level prose: "why it matters" per entry, the run narrative and
//! per-section briefs. All template-filled from counts, so the same
//! selection always reads the same.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analyze::annotate::events;
use crate::analyze::types::{AnnotatedEntry, Flags};
use crate::config::BriefConfig;
use crate::ingest::normalize::truncate_chars;
use crate::synth::sentences::split_sentences;

fn so_what_for_event(event: &str) -> Option<&'static str> {
    Some(match event {
        events::SANCTIONS => "It shifts counterparty and licensing risk for anyone with state-linked exposure.",
        events::GOVERNANCE => "It changes the policy outlook and how predictably rules will be enforced.",
        events::MACRO => "It feeds into FX, inflation and near-term operating assumptions.",
        events::ENERGY => "It affects who can contract in the oil sector and at what execution risk.",
        events::HUMANITARIAN => "It raises duty-of-care and delivery pressure for any field presence.",
        events::PROCUREMENT => "It points to a live funding or tender channel worth screening.",
        events::SECURITY => "It raises security and continuity risk for people and assets on the ground.",
        events::TRADE => "It changes market access and the case for new investment.",
        _ => return None,
    })
}

fn flag_clause(flags: Flags, country: &str) -> Option<String> {
    match (flags.opportunity, flags.risk) {
        (true, true) => Some("It carries both an opening and a downside to watch.".into()),
        (true, false) => Some("It may open a commercial or funding opportunity.".into()),
        (false, true) => Some(format!("It adds to the risk picture for {country} exposure.")),
        (false, false) => None,
    }
}

/// One or two template sentences keyed on the dominant event type (else the
/// sector) plus the entry's flags.
pub fn why_it_matters(sector: &str, event_types: &[String], flags: Flags, cfg: &BriefConfig) -> String {
    let country = cfg.country.name.as_str();
    let base = event_types
        .first()
        .and_then(|e| so_what_for_event(e))
        .map(str::to_string)
        .unwrap_or_else(|| format!("It signals a change in {} conditions for {country}.", sector.to_lowercase()));

    match flag_clause(flags, country) {
        Some(clause) => format!("{base} {clause}"),
        None => base,
    }
}

/// Sentence used when nothing survived selection.
pub fn empty_narrative(cfg: &BriefConfig) -> String {
    format!("No qualifying items were identified for {} this cycle.", cfg.country.name)
}

/// Counts in first-seen order, then by count desc (stable).
fn tally<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for l in labels {
        let c = counts.entry(l).or_insert(0);
        if *c == 0 {
            order.push(l);
        }
        *c += 1;
    }
    let mut out: Vec<(&str, usize)> = order.into_iter().map(|l| (l, counts[l])).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Multi-sentence synthesis over the whole selected set.
pub fn narrative(selected: &[AnnotatedEntry], cfg: &BriefConfig) -> String {
    if selected.is_empty() {
        return empty_narrative(cfg);
    }
    let country = cfg.country.name.as_str();
    let mut out: Vec<String> = Vec::new();

    let dates: Vec<_> = selected.iter().filter_map(|e| e.entry().published_at).collect();
    let span = match (dates.iter().min(), dates.iter().max()) {
        (Some(lo), Some(hi)) if lo.date_naive() == hi.date_naive() => {
            format!(", all published {}", lo.format("%Y-%m-%d"))
        }
        (Some(lo), Some(hi)) => format!(
            ", published between {} and {}",
            lo.format("%Y-%m-%d"),
            hi.format("%Y-%m-%d")
        ),
        _ => ", none carrying a publication date".to_string(),
    };
    out.push(format!(
        "{} selected for {country} this cycle{span}.",
        plural(selected.len(), "item was", "items were")
    ));

    let sectors = tally(selected.iter().map(|e| e.sector()));
    let sector_phrase: Vec<String> = sectors
        .iter()
        .take(2)
        .map(|(label, n)| format!("{label} ({n})"))
        .collect();
    out.push(format!("Coverage concentrates in {}.", sector_phrase.join(" and ")));

    let opps = selected.iter().filter(|e| e.flags().opportunity).count();
    let risks = selected.iter().filter(|e| e.flags().risk).count();
    out.push(format!("Opportunity flags: {opps}; risk flags: {risks}."));

    let events = tally(selected.iter().flat_map(|e| e.event_types.iter().map(String::as_str)));
    if let Some((event, n)) = events.first() {
        out.push(format!(
            "The most frequent signal is {} ({}).",
            event.to_lowercase(),
            plural(*n, "item", "items")
        ));
    }

    out.join(" ")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionBrief {
    pub label: String,
    pub count: usize,
    pub opportunities: usize,
    pub risks: usize,
    pub lead_title: Option<String>,
    pub summary: String,
}

pub const EMPTY_SECTION: &str = "No items this cycle.";

/// One brief per display section (configured order), then any other sector
/// that appears in the selection. `selected` is in rank order.
pub fn section_briefs(selected: &[AnnotatedEntry], cfg: &BriefConfig) -> Vec<SectionBrief> {
    let mut labels = cfg.section_order();
    for e in selected {
        if !labels.iter().any(|l| l == e.sector()) {
            labels.push(e.sector().to_string());
        }
    }

    labels
        .into_iter()
        .map(|label| {
            let items: Vec<&AnnotatedEntry> = selected.iter().filter(|e| e.sector() == label).collect();
            let lead = items.first();
            let summary = lead
                .and_then(|e| split_sentences(&e.summary_text).into_iter().next())
                .map(|s| truncate_chars(&s, cfg.summary.max_chars))
                .unwrap_or_else(|| EMPTY_SECTION.to_string());
            SectionBrief {
                count: items.len(),
                opportunities: items.iter().filter(|e| e.flags().opportunity).count(),
                risks: items.iter().filter(|e| e.flags().risk).count(),
                lead_title: lead.map(|e| e.entry().title.clone()),
                summary,
                label,
            }
        })
        .collect()
}
