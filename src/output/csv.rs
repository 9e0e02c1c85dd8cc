//! One row per selected item. Uses the `csv` crate for quoting.

use anyhow::{Context, Result};

use crate::analyze::types::AnnotatedEntry;

const HEADER: [&str; 12] = [
    "id",
    "title",
    "link",
    "published_at",
    "source_domain",
    "sector",
    "score",
    "flags",
    "event_types",
    "sentiment",
    "materiality",
    "risk_score",
];

pub fn render(items: &[AnnotatedEntry]) -> Result<String> {
    let mut wtr = ::csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());
    wtr.write_record(HEADER)?;

    for e in items {
        let entry = e.entry();
        let published = entry
            .published_at
            .map(|d| d.to_rfc3339())
            .unwrap_or_default();
        wtr.write_record([
            e.stable_id.as_str(),
            entry.title.as_str(),
            entry.link.as_str(),
            published.as_str(),
            entry.source_domain.as_str(),
            e.sector(),
            format!("{:.4}", e.score()).as_str(),
            e.flags().labels().join("|").as_str(),
            e.event_types.join("|").as_str(),
            e.sentiment.as_str(),
            e.materiality.to_string().as_str(),
            e.risk_score.to_string().as_str(),
        ])?;
    }

    wtr.flush()?;
    let bytes = wtr.into_inner().map_err(|e| anyhow::anyhow!("csv writer: {e}"))?;
    String::from_utf8(bytes).context("csv output is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_only_for_empty_selection() {
        let s = render(&[]).unwrap();
        assert_eq!(s.lines().count(), 1);
        assert!(s.starts_with("id,title,link,published_at"));
    }
}
