//! `feeds.txt` loader: one feed per line, `#` comments, optional `Label - URL` form.

use anyhow::Context;
use std::path::Path;

pub const DEFAULT_FEEDS_PATH: &str = "feeds.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSpec {
    pub label: Option<String>,
    pub url: String,
}

impl FeedSpec {
    /// Label if present, else the URL host.
    pub fn display_name(&self) -> String {
        if let Some(l) = &self.label {
            return l.clone();
        }
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.url.clone())
    }
}

pub fn load_feeds(path: &Path) -> anyhow::Result<Vec<FeedSpec>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read feed list at {}", path.display()))?;
    Ok(parse_feed_list(&raw))
}

/// Lines that do not resolve to an `http(s)` URL are skipped.
pub fn parse_feed_list(raw: &str) -> Vec<FeedSpec> {
    let mut out = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (label, url) = match line.split_once(" - http") {
            Some((label, rest)) => {
                let label = label.trim();
                let label = (!label.is_empty()).then(|| label.to_string());
                (label, format!("http{}", rest.trim()))
            }
            None => (None, line.to_string()),
        };
        if url.starts_with("http://") || url.starts_with("https://") {
            out.push(FeedSpec { label, url });
        }
    }
    out
}
