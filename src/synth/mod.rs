//! Summaries, numeric facts and set-level prose for selected entries.

pub mod exec;
pub mod facts;
pub mod narrative;
pub mod sentences;
pub mod summary;

pub use narrative::{narrative, section_briefs, why_it_matters, SectionBrief};
pub use summary::{pick, summarize, Summary, SummarySource};
