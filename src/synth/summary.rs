// src/synth/summary.rs
//! Per-entry summary with a fixed preference chain:
//! feed snippet → meta description → first paragraph → best article sentence → template.
//! The template is picked by a stable hash of the entry, so unchanged input
//! renders the same text on every run.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analyze::dedup::{title_key, title_similarity};
use crate::config::{BriefConfig, SummaryConfig};
use crate::ingest::article::ArticleText;
use crate::ingest::normalize::{clean_title, is_boilerplate, normalize_text, truncate_chars};
use crate::ingest::types::Entry;
use crate::synth::sentences::{best_sentence, is_noise_sentence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    FeedSnippet,
    MetaDescription,
    FirstParagraph,
    ArticleSentence,
    Fallback,
}

impl SummarySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummarySource::FeedSnippet => "feed_snippet",
            SummarySource::MetaDescription => "meta_description",
            SummarySource::FirstParagraph => "first_paragraph",
            SummarySource::ArticleSentence => "article_sentence",
            SummarySource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    pub source: SummarySource,
}

/// First 8 bytes of SHA-256, big endian. Stable across platforms and runs.
pub fn stable_hash(seed: &str) -> u64 {
    let digest = Sha256::digest(seed.as_bytes());
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(buf)
}

/// `options[hash(seed) % len]`; `None` only for an empty slice.
pub fn pick<'a, T>(seed: &str, options: &'a [T]) -> Option<&'a T> {
    if options.is_empty() {
        return None;
    }
    let idx = (stable_hash(seed) % options.len() as u64) as usize;
    options.get(idx)
}

/// Normalized candidate text, or `None` when it is boilerplate, noise, too
/// short, or just the headline again (aggregator snippets often are).
pub fn clean_snippet(raw: &str, title: &str, cfg: &SummaryConfig) -> Option<String> {
    let text = normalize_text(raw);
    if is_boilerplate(&text) || text.chars().count() < cfg.min_sentence_chars {
        return None;
    }
    if is_noise_sentence(&text) {
        return None;
    }

    let tkey = title_key(&clean_title(title));
    if !tkey.is_empty() {
        let skey = title_key(&text);
        if skey.starts_with(&tkey) || title_similarity(&skey, &tkey) >= cfg.title_similarity_threshold {
            return None;
        }
    }
    Some(truncate_chars(&text, cfg.max_chars))
}

const FALLBACK_TEMPLATES: &[&str] = &[
    "{topic}. Flagged under {sector} for {country}; the source offered no usable summary text.",
    "Coverage on {topic} tracked under {sector}; open the source for full details.",
    "{country} update under {sector}: {topic}.",
    "Reported development for {country}: {topic}. Filed under {sector}.",
];

/// Deterministic template sentence built from the headline topic and sector.
pub fn fallback_summary(entry: &Entry, sector: &str, country: &str, max_chars: usize) -> String {
    let topic = clean_title(&entry.title);
    let topic = if topic.is_empty() {
        "an untitled item".to_string()
    } else {
        truncate_chars(topic.trim_end_matches('.'), 140)
    };
    let seed = if entry.link.is_empty() { &entry.title } else { &entry.link };
    let template = pick(seed, FALLBACK_TEMPLATES).copied().unwrap_or(FALLBACK_TEMPLATES[0]);
    let text = template
        .replace("{topic}", &topic)
        .replace("{sector}", sector)
        .replace("{country}", country);
    truncate_chars(&text, max_chars)
}

/// Walk the preference chain. Never returns empty text.
pub fn summarize(entry: &Entry, sector: &str, article: Option<&ArticleText>, cfg: &BriefConfig) -> Summary {
    let sc = &cfg.summary;
    let title = entry.title.as_str();

    if let Some(text) = clean_snippet(&entry.summary, title, sc) {
        return Summary { text, source: SummarySource::FeedSnippet };
    }

    if let Some(a) = article {
        if let Some(text) = a.meta_description.as_deref().and_then(|m| clean_snippet(m, title, sc)) {
            return Summary { text, source: SummarySource::MetaDescription };
        }
        if let Some(text) = a.first_paragraph.as_deref().and_then(|p| clean_snippet(p, title, sc)) {
            return Summary { text, source: SummarySource::FirstParagraph };
        }
    }

    // full article body, else the feed's own content:encoded
    let body = article
        .and_then(|a| a.full_text.as_deref())
        .or(entry.content.as_deref());
    if let Some(best) = body.and_then(|b| {
        best_sentence(b, title, sc.min_sentence_chars, sc.title_similarity_threshold)
    }) {
        return Summary {
            text: truncate_chars(&best, sc.max_chars),
            source: SummarySource::ArticleSentence,
        };
    }

    Summary {
        text: fallback_summary(entry, sector, &cfg.country.name, sc.max_chars),
        source: SummarySource::Fallback,
    }
}
