//! Markdown brief for the static site.

use std::fmt::Write;

use crate::analyze::types::AnnotatedEntry;
use crate::pipeline::Brief;
use crate::synth::narrative::EMPTY_SECTION;

fn date_or_dash(e: &AnnotatedEntry) -> String {
    e.entry()
        .published_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

/// Brackets in titles would break the link syntax.
fn escape_link_text(s: &str) -> String {
    s.replace('[', "\\[").replace(']', "\\]")
}

fn render_item(out: &mut String, e: &AnnotatedEntry) {
    let entry = e.entry();
    let title = escape_link_text(&entry.title);
    if entry.link.is_empty() {
        let _ = writeln!(out, "- **{title}**");
    } else {
        let _ = writeln!(out, "- **[{title}]({})**", entry.link);
    }

    let mut meta = format!(
        "  - Score: {:.3} | Date: {} | Source: {}",
        e.score(),
        date_or_dash(e),
        if entry.source_domain.is_empty() { "unknown" } else { entry.source_domain.as_str() }
    );
    let flags = e.flags().labels();
    if !flags.is_empty() {
        let _ = write!(meta, " | Flags: {}", flags.join(", "));
    }
    let _ = writeln!(out, "{meta}");

    let _ = writeln!(out, "  - {}", e.summary_text);
    let _ = writeln!(out, "  - _Why it matters:_ {}", e.why_it_matters);
    if !e.event_types.is_empty() || !e.entities.is_empty() {
        let _ = writeln!(
            out,
            "  - Events: {} | Entities: {} | Sentiment: {} | Materiality: {}/5 | Risk: {}/100",
            if e.event_types.is_empty() { "-".to_string() } else { e.event_types.join(", ") },
            if e.entities.is_empty() { "-".to_string() } else { e.entities.join(", ") },
            e.sentiment.as_str(),
            e.materiality,
            e.risk_score
        );
    }
    if let Some(opp) = &e.opportunity {
        let mut parts = Vec::new();
        if let Some(d) = &opp.deadline {
            parts.push(if opp.expired { format!("deadline {d} (passed)") } else { format!("deadline {d}") });
        }
        if let Some(a) = &opp.amount {
            parts.push(format!("amount {a}"));
        }
        let _ = writeln!(out, "  - Opportunity: {}", parts.join(", "));
    }
}

pub fn render(brief: &Brief) -> String {
    let mut out = String::new();
    let s = &brief.stats;

    let _ = writeln!(out, "# {} Brief", brief.country);
    let _ = writeln!(out);
    let _ = writeln!(out, "_Generated {}_", brief.generated_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out);

    let _ = writeln!(out, "## Pipeline metrics");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Stage | Count |");
    let _ = writeln!(out, "|---|---|");
    for (label, n) in [
        ("Fetched", s.fetched),
        ("Feed errors", s.provider_errors),
        ("After filters", s.after_filter),
        ("After dedup", s.after_dedup),
        ("Selected", s.selected),
        ("New since last run", brief.diff.new),
        ("Updated since last run", brief.diff.updated),
        ("Dropped since last run", brief.diff.dropped),
    ] {
        let _ = writeln!(out, "| {label} | {n} |");
    }
    let _ = writeln!(out);

    let sc = &brief.score_summary;
    let _ = writeln!(out, "## Scoring summary");
    let _ = writeln!(out);
    if sc.count == 0 {
        let _ = writeln!(out, "No scored items.");
    } else {
        let _ = writeln!(
            out,
            "{} items, average {:.3}, max {:.3}, min {:.3}.",
            sc.count, sc.average, sc.max, sc.min
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Overview");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", brief.narrative);
    let _ = writeln!(out);

    if !brief.exec_rows.is_empty() {
        let _ = writeln!(out, "## Executive brief");
        let _ = writeln!(out);
        for row in &brief.exec_rows {
            let _ = writeln!(out, "- **{}**: {}", row.subheading, row.sentence);
        }
        let _ = writeln!(out);
    }

    for section in &brief.sections {
        let _ = writeln!(out, "## {}", section.label);
        let _ = writeln!(out);
        let items: Vec<&AnnotatedEntry> = brief.items.iter().filter(|e| e.sector() == section.label).collect();
        if items.is_empty() {
            let _ = writeln!(out, "_{EMPTY_SECTION}_");
        } else {
            let _ = writeln!(
                out,
                "{} items ({} opportunities, {} risks).",
                section.count, section.opportunities, section.risks
            );
            let _ = writeln!(out);
            for e in items {
                render_item(&mut out, e);
            }
        }
        let _ = writeln!(out);
    }

    out
}
