// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod metrics;
pub mod sentiment;
pub mod snapshot;
pub mod source_weights;

// Feed fetching, article text, normalization and the candidate filter
pub mod ingest;

// Relevance core: dedup, scoring, classification, selection, annotation
pub mod analyze;

// Summaries, facts, narrative and executive rows
pub mod synth;

pub mod output;
pub mod pipeline;

// ---- Re-exports for stable public API ----
pub use crate::config::BriefConfig;
pub use crate::ingest::types::Entry;
pub use crate::pipeline::{assemble, build_brief, shortlist, Brief, RunStats};

use sha2::{Digest, Sha256};

/// Short, stable, non-reversible id for debug logs (first 6 bytes of SHA-256, hex).
pub(crate) fn anon_hash(s: &str) -> String {
    let digest = Sha256::digest(s.as_bytes());
    digest[..6].iter().map(|b| format!("{b:02x}")).collect()
}
