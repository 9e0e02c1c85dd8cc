// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One fetched feed item, before any relevance processing.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub title: String,
    pub link: String,    // may be empty
    pub summary: String, // normalized feed snippet
    #[serde(default, skip_serializing)]
    pub content: Option<String>, // raw feed body, not part of output
    pub published_at: Option<DateTime<Utc>>, // None = undated
    pub source_url: String,                  // feed URL the item came from
    pub source_domain: String,               // "" when unknown
}

impl Entry {
    /// Lowercased `title + " " + summary`, the haystack for term matching.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.summary).to_lowercase()
    }
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<Entry>>;
    fn name(&self) -> &str;
}
