//! JSON artifacts: the full brief and the run stats.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::pipeline::Brief;

fn pretty<T: Serialize>(value: &T) -> Result<String> {
    let mut s = serde_json::to_string_pretty(value).context("serialize JSON")?;
    s.push('\n');
    Ok(s)
}

/// `latest.json`
pub fn render_latest(brief: &Brief) -> Result<String> {
    pretty(brief)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LastRun<'a> {
    generated_at: String,
    country: &'a str,
    #[serde(flatten)]
    stats: &'a crate::pipeline::RunStats,
    new: usize,
    updated: usize,
    dropped: usize,
}

/// `last_run.json`
pub fn render_last_run(brief: &Brief) -> Result<String> {
    pretty(&LastRun {
        generated_at: brief.generated_at.to_rfc3339(),
        country: &brief.country,
        stats: &brief.stats,
        new: brief.diff.new,
        updated: brief.diff.updated,
        dropped: brief.diff.dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BriefConfig;
    use crate::pipeline::build_brief;
    use crate::snapshot::RunSnapshot;
    use chrono::TimeZone;

    #[test]
    fn last_run_is_flat_camel_case() {
        let cfg = BriefConfig::embedded();
        let now = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap();
        let (brief, _) = build_brief(Vec::new(), &RunSnapshot::default(), &cfg, now);

        let v: serde_json::Value = serde_json::from_str(&render_last_run(&brief).unwrap()).unwrap();
        assert_eq!(v["generatedAt"], "2026-03-01T06:00:00+00:00");
        assert_eq!(v["country"], "Venezuela");
        assert_eq!(v["afterDedup"], 0);
        assert_eq!(v["new"], 0);
        assert!(render_latest(&brief).unwrap().ends_with("}\n"));
    }
}
