//! Numeric facts (amounts, percentages, volumes, counts) and opportunity
//! details (deadline, amount) pulled from summary or article text.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ingest::normalize::truncate_chars;
use crate::synth::sentences::split_sentences;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactKind {
    Currency,
    Percentage,
    Volume,
    Count,
    Figure,
}

impl FactKind {
    fn weight(self) -> i32 {
        match self {
            FactKind::Currency | FactKind::Volume => 4,
            FactKind::Percentage => 3,
            FactKind::Count => 2,
            FactKind::Figure => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericFact {
    pub kind: FactKind,
    pub value: String,
    pub context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityDetails {
    pub deadline: Option<String>,
    pub deadline_date: Option<NaiveDate>,
    pub expired: bool,
    pub amount: Option<String>,
}

const MULT: &str = r"(?:\s?(?:million|billion|trillion|bn|mn|m|b)\b)?";
const NUM: &str = r"\d{1,3}(?:,\d{3})*(?:\.\d+)?|\d+(?:\.\d+)?";

/// Tried in order; earlier kinds claim their span first.
static PATTERNS: Lazy<Vec<(FactKind, Regex)>> = Lazy::new(|| {
    let p = |s: String| Regex::new(&s).expect("fact regex");
    vec![
        (
            FactKind::Currency,
            p(format!(r"(?i)(?:US\$|\$|€|£|\bUSD\s?|\bEUR\s?)\s?(?:{NUM}){MULT}")),
        ),
        (
            FactKind::Currency,
            p(format!(r"(?i)\b(?:{NUM})\s?(?:million|billion|trillion)?\s?(?:dollars|usd|euros|bolivars|bolívares)\b")),
        ),
        (
            FactKind::Volume,
            p(format!(r"(?i)\b(?:{NUM})\s?(?:million\s|thousand\s)?(?:barrels|bpd|b/d)(?:\s(?:per|a)\sday)?")),
        ),
        (
            FactKind::Percentage,
            p(format!(r"(?i)\b(?:{NUM})\s?(?:%|percent\b|per cent\b)")),
        ),
        (
            FactKind::Count,
            p(format!(r"(?i)\b(?:{NUM})\s?(?:million\s|billion\s|thousand\s)?(?:people|migrants|refugees|workers|children|families|households|jobs|tons|tonnes|deaths|cases|prisoners|detainees)\b")),
        ),
        (
            FactKind::Figure,
            p(format!(r"(?i)\b(?:{NUM})(?:\s(?:million|billion|trillion))?\b")),
        ),
    ]
});

static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:19|20)\d{2}$").expect("year regex"));

const PRIORITY_TERMS: &[&str] = &[
    "oil", "export", "production", "debt", "inflation", "investment", "contract", "sanction",
    "budget", "gdp", "reserves", "loan", "grant", "funding", "migrants",
];

/// Bare 4-digit years and small integers carry no information on their own.
fn is_trivial_figure(value: &str) -> bool {
    let v = value.trim();
    if RE_YEAR.is_match(v) {
        return true;
    }
    if v.contains('.') || v.contains(',') || v.chars().any(char::is_alphabetic) {
        return false;
    }
    v.parse::<u64>().map_or(false, |n| n < 100)
}

fn normalized_value(v: &str) -> String {
    v.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect()
}

fn rank(f: &NumericFact) -> i32 {
    let low = f.context.to_lowercase();
    let priority = PRIORITY_TERMS.iter().filter(|t| low.contains(*t)).count() as i32;
    let context_bonus = (f.context.chars().count() / 40).min(3) as i32;
    2 * priority + f.kind.weight() + context_bonus
}

/// Up to `max` facts, best first. Total over any input.
pub fn extract_facts(text: &str, max: usize) -> Vec<NumericFact> {
    let mut found: Vec<NumericFact> = Vec::new();

    for sentence in split_sentences(text) {
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        for (kind, re) in PATTERNS.iter() {
            for m in re.find_iter(&sentence) {
                let (s, e) = (m.start(), m.end());
                if claimed.iter().any(|&(cs, ce)| s < ce && cs < e) {
                    continue;
                }
                let value = m.as_str().trim().to_string();
                if *kind == FactKind::Figure && is_trivial_figure(&value) {
                    continue;
                }
                claimed.push((s, e));
                found.push(NumericFact {
                    kind: *kind,
                    value,
                    context: truncate_chars(&sentence, 160),
                });
            }
        }
    }

    // stable sort keeps text order among equal ranks
    found.sort_by_key(|f| std::cmp::Reverse(rank(f)));

    let mut seen: HashSet<(FactKind, String, String)> = HashSet::new();
    found
        .into_iter()
        .filter(|f| {
            let prefix: String = f.context.to_lowercase().chars().take(40).collect();
            seen.insert((f.kind, normalized_value(&f.value), prefix))
        })
        .take(max)
        .collect()
}

static DEADLINE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(submission deadline|deadline|due by|due|closing date|closes)\s*[:\-]?\s*(\w+\s+\d{1,2},\s+20\d{2})",
        r"(?i)(submission deadline|deadline|due by|due|closing date|closes)\s*[:\-]?\s*(20\d{2}-\d{2}-\d{2})",
        r"(?i)(fecha l[ií]mite|cierre|vence|hasta el)\s*[:\-]?\s*(\d{1,2}\s+de\s+\w+\s+de\s+20\d{2})",
        r"(?i)(fecha l[ií]mite|cierre|vence|hasta el)\s*[:\-]?\s*(20\d{2}-\d{2}-\d{2})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("deadline regex"))
    .collect()
});

static AMOUNT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\$|usd\s*)\s?(\d{1,3}(?:,\d{3})*(?:\.\d+)?)(\s*(million|billion|m|bn)\b)?",
        r"(?i)(\d{1,3}(?:,\d{3})*(?:\.\d+)?)\s*(usd|dollars)\b",
        r"(?i)(€)\s?(\d{1,3}(?:,\d{3})*(?:\.\d+)?)(\s*(million|billion|m|bn)\b)?",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("amount regex"))
    .collect()
});

static RE_ES_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\s+de\s+([a-záéíóúñ]+)\s+de\s+(20\d{2})$").expect("es date regex"));

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn extract_deadline(text: &str) -> Option<String> {
    DEADLINE_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|c| c.get(2))
        .map(|m| collapse_ws(m.as_str()))
}

pub fn extract_amount(text: &str) -> Option<String> {
    AMOUNT_PATTERNS
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| collapse_ws(m.as_str()))
}

fn spanish_month(name: &str) -> Option<u32> {
    Some(match name {
        "enero" => 1,
        "febrero" => 2,
        "marzo" => 3,
        "abril" => 4,
        "mayo" => 5,
        "junio" => 6,
        "julio" => 7,
        "agosto" => 8,
        "septiembre" | "setiembre" => 9,
        "octubre" => 10,
        "noviembre" => 11,
        "diciembre" => 12,
        _ => return None,
    })
}

/// Calendar date of an extracted deadline, when it can be read.
pub fn parse_deadline_date(raw: &str) -> Option<NaiveDate> {
    let text = collapse_ws(raw);
    for fmt in ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(&text, fmt) {
            return Some(d);
        }
    }
    let low = text.to_lowercase();
    let caps = RE_ES_DATE.captures(&low)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = spanish_month(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Deadline and amount for an opportunity-flagged entry. `None` when neither is present.
pub fn opportunity_details(text: &str, today: NaiveDate) -> Option<OpportunityDetails> {
    let deadline = extract_deadline(text);
    let amount = extract_amount(text);
    if deadline.is_none() && amount.is_none() {
        return None;
    }
    let deadline_date = deadline.as_deref().and_then(parse_deadline_date);
    Some(OpportunityDetails {
        expired: deadline_date.is_some_and(|d| d < today),
        deadline,
        deadline_date,
        amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_typed_facts() {
        let text = "PDVSA exported 850,000 barrels per day in January. \
                    Inflation slowed to 48.2% while the government secured a $1.5 billion loan. \
                    About 7.7 million migrants have left since 2015.";
        let facts = extract_facts(text, 10);
        let kinds: Vec<(FactKind, &str)> = facts.iter().map(|f| (f.kind, f.value.as_str())).collect();
        assert!(kinds.contains(&(FactKind::Volume, "850,000 barrels per day")));
        assert!(kinds.contains(&(FactKind::Percentage, "48.2%")));
        assert!(kinds.contains(&(FactKind::Currency, "$1.5 billion")));
        assert!(kinds.contains(&(FactKind::Count, "7.7 million migrants")));
        assert!(!facts.iter().any(|f| f.value == "2015"), "years are dropped");
    }

    #[test]
    fn small_integers_and_years_dropped() {
        let facts = extract_facts("Section 3 of the 2024 report lists 12 items and 4,500 units.", 10);
        let values: Vec<&str> = facts.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, vec!["4,500"]);
    }

    #[test]
    fn duplicates_collapse() {
        let facts = extract_facts("Output hit 1,000 bpd. Output hit 1,000 bpd.", 10);
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn empty_text_has_no_facts() {
        assert!(extract_facts("", 3).is_empty());
        assert!(extract_facts("No numbers here at all.", 3).is_empty());
    }

    #[test]
    fn deadlines_and_amounts() {
        assert_eq!(
            extract_deadline("Submission deadline: March 15, 2026 for all bidders").as_deref(),
            Some("March 15, 2026")
        );
        assert_eq!(extract_deadline("closing date 2026-04-01").as_deref(), Some("2026-04-01"));
        assert_eq!(
            extract_deadline("Fecha límite: 5 de mayo de 2026").as_deref(),
            Some("5 de mayo de 2026")
        );
        assert_eq!(extract_amount("A grant of USD 250,000 is available").as_deref(), Some("USD 250,000"));
        assert_eq!(extract_amount("no money mentioned"), None);
    }

    #[test]
    fn expired_deadlines_flagged() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
        let d = opportunity_details("RFP due by March 15, 2026.", today).unwrap();
        assert_eq!(d.deadline_date, NaiveDate::from_ymd_opt(2026, 3, 15));
        assert!(d.expired);
        let d = opportunity_details("Cierre: 5 de mayo de 2026", today).unwrap();
        assert!(!d.expired);
        assert!(opportunity_details("Tender announced", today).is_none());
    }
}
