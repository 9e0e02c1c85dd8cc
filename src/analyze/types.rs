// src/analyze/types.rs
//! Enrichment stages: Entry → ScoredEntry → ClassifiedEntry → AnnotatedEntry.
//! Each stage wraps the previous one; serialized output stays flat.

use serde::{Deserialize, Serialize};

use crate::ingest::types::Entry;
use crate::synth::facts::{NumericFact, OpportunityDetails};
use crate::synth::summary::SummarySource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredEntry {
    #[serde(flatten)]
    pub entry: Entry,
    pub score: f64, // [0,1], 4 decimals
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub opportunity: bool,
    pub risk: bool,
}

impl Flags {
    pub fn labels(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.opportunity {
            out.push("Opportunity");
        }
        if self.risk {
            out.push("Risk");
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedEntry {
    #[serde(flatten)]
    pub scored: ScoredEntry,
    pub sector: String,
    pub flags: Flags,
}

impl ClassifiedEntry {
    pub fn entry(&self) -> &Entry {
        &self.scored.entry
    }

    pub fn score(&self) -> f64 {
        self.scored.score
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedEntry {
    #[serde(flatten)]
    pub classified: ClassifiedEntry,
    pub stable_id: String,
    pub event_types: Vec<String>, // ≤3, deduped
    pub sentiment: Sentiment,
    pub materiality: u8, // 1..=5
    pub risk_score: u8,  // 0..=100
    pub entities: Vec<String>, // ≤4
    pub summary_text: String,
    pub summary_source: SummarySource,
    pub why_it_matters: String,
    pub facts: Vec<NumericFact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<OpportunityDetails>,
}

impl AnnotatedEntry {
    pub fn entry(&self) -> &Entry {
        self.classified.entry()
    }

    pub fn score(&self) -> f64 {
        self.classified.score()
    }

    pub fn sector(&self) -> &str {
        &self.classified.sector
    }

    pub fn flags(&self) -> Flags {
        self.classified.flags
    }
}
