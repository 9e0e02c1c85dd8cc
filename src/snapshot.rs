// src/snapshot.rs
//! Previous run's selection, used only to count new/updated/dropped items.
//! A missing or unreadable snapshot is an empty baseline.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::analyze::dedup::title_key;
use crate::analyze::types::AnnotatedEntry;
use crate::ingest::types::Entry;

pub const DEFAULT_SNAPSHOT_PATH: &str = "docs/data/snapshot.json";

/// Link when present, else the normalized title.
pub fn stable_id(entry: &Entry) -> String {
    if entry.link.is_empty() {
        format!("title:{}", title_key(&entry.title))
    } else {
        entry.link.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub sector: String,
    pub score: f64,
    /// Hex SHA-256 over the rendered fields; a change means "updated".
    pub fingerprint: String,
}

impl SnapshotItem {
    pub fn from_annotated(e: &AnnotatedEntry) -> Self {
        let entry = e.entry();
        let score = format!("{:.4}", e.score());
        let flags = e.flags().labels().join(",");
        let mut h = Sha256::new();
        for part in [entry.title.as_str(), e.sector(), e.summary_text.as_str(), score.as_str(), flags.as_str()] {
            h.update(part.as_bytes());
            h.update([0u8]);
        }
        let fingerprint: String = h.finalize().iter().map(|b| format!("{b:02x}")).collect();
        Self {
            id: e.stable_id.clone(),
            title: entry.title.clone(),
            link: entry.link.clone(),
            sector: e.sector().to_string(),
            score: e.score(),
            fingerprint,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshot {
    pub generated_at: Option<DateTime<Utc>>,
    pub items: Vec<SnapshotItem>,
}

impl RunSnapshot {
    pub fn from_selection(selected: &[AnnotatedEntry], generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at: Some(generated_at),
            items: selected.iter().map(SnapshotItem::from_annotated).collect(),
        }
    }

    /// Tolerant read: missing file or bad JSON yields an empty snapshot.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(target: "snapshot", path = %path.display(), error = %e, "corrupt snapshot ignored");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let mut s = serde_json::to_string_pretty(self).context("serialize snapshot")?;
        s.push('\n');
        Ok(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDiff {
    pub new: usize,
    pub updated: usize,
    pub dropped: usize,
    pub unchanged: usize,
    pub new_ids: Vec<String>,
    pub updated_ids: Vec<String>,
    pub dropped_ids: Vec<String>,
}

/// Compare by stable id. Id lists follow current order (new, updated) and
/// previous order (dropped).
pub fn diff(previous: &RunSnapshot, current: &RunSnapshot) -> SnapshotDiff {
    let prev: HashMap<&str, &SnapshotItem> = previous.items.iter().map(|i| (i.id.as_str(), i)).collect();
    let cur: HashMap<&str, &SnapshotItem> = current.items.iter().map(|i| (i.id.as_str(), i)).collect();

    let mut d = SnapshotDiff::default();
    for item in &current.items {
        match prev.get(item.id.as_str()) {
            None => d.new_ids.push(item.id.clone()),
            Some(old) if old.fingerprint != item.fingerprint => d.updated_ids.push(item.id.clone()),
            Some(_) => d.unchanged += 1,
        }
    }
    d.dropped_ids = previous
        .items
        .iter()
        .filter(|i| !cur.contains_key(i.id.as_str()))
        .map(|i| i.id.clone())
        .collect();

    d.new = d.new_ids.len();
    d.updated = d.updated_ids.len();
    d.dropped = d.dropped_ids.len();
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, fp: &str) -> SnapshotItem {
        SnapshotItem {
            id: id.into(),
            title: id.into(),
            link: id.into(),
            sector: "S".into(),
            score: 0.5,
            fingerprint: fp.into(),
        }
    }

    fn snap(items: Vec<SnapshotItem>) -> RunSnapshot {
        RunSnapshot { generated_at: None, items }
    }

    #[test]
    fn new_updated_dropped() {
        let prev = snap(vec![item("a", "1"), item("b", "1"), item("c", "1")]);
        let cur = snap(vec![item("b", "2"), item("c", "1"), item("d", "1")]);
        let d = diff(&prev, &cur);
        assert_eq!((d.new, d.updated, d.dropped, d.unchanged), (1, 1, 1, 1));
        assert_eq!(d.new_ids, vec!["d"]);
        assert_eq!(d.updated_ids, vec!["b"]);
        assert_eq!(d.dropped_ids, vec!["a"]);
    }

    #[test]
    fn empty_baseline_marks_everything_new() {
        let d = diff(&RunSnapshot::default(), &snap(vec![item("a", "1")]));
        assert_eq!(d.new, 1);
        assert_eq!(d.dropped, 0);
    }

    #[test]
    fn stable_id_falls_back_to_title() {
        let e = Entry { title: "Oil, Output  RISES!".into(), ..Default::default() };
        assert_eq!(stable_id(&e), "title:oil output rises");
        let e = Entry { link: "https://x/1".into(), ..e };
        assert_eq!(stable_id(&e), "https://x/1");
    }

    #[test]
    fn corrupt_or_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.json");
        assert_eq!(RunSnapshot::load(&missing), RunSnapshot::default());
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert_eq!(RunSnapshot::load(&bad), RunSnapshot::default());
    }
}
