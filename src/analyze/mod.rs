// src/analyze/mod.rs
//! Relevance core: dedup, scoring, classification, selection and annotation.
//! Everything here is synchronous and total over any entry shape.

pub mod annotate;
pub mod classify;
pub mod dedup;
pub mod scoring;
pub mod select;
pub mod terms;
pub mod types;

// Re-export convenient entry points.
pub use crate::analyze::annotate::annotate;
pub use crate::analyze::classify::{classify, classify_entry, detect_flags, SectorMatch};
pub use crate::analyze::dedup::{deduplicate, deduplicate_with_stats, DedupOutcome};
pub use crate::analyze::scoring::{rank, score, score_breakdown, ScoreBreakdown};
pub use crate::analyze::select::{select, select_top};
pub use crate::analyze::types::{AnnotatedEntry, ClassifiedEntry, Flags, ScoredEntry, Sentiment};
