//! Sentence splitting and quality heuristics for extractive summaries.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyze::dedup::{title_key, title_similarity};
use crate::ingest::normalize::{is_boilerplate, normalize_text};

/// Navigation, paywall and consent chrome. Any hit rejects the sentence.
const HARD_NOISE: &[&str] = &[
    "subscribe",
    "subscription",
    "cookie",
    "sign in",
    "sign up",
    "log in",
    "newsletter",
    "privacy policy",
    "terms of use",
    "all rights reserved",
    "accept all",
    "javascript",
    "already a subscriber",
    "skip to",
    "copy citation",
    "url source",
    "markdown content",
];

/// Residual noise that lowers a sentence's rank without rejecting it.
const SOFT_NOISE: &[&str] = &[
    "click", "photo", "video", "advertisement", "read also", "related", "share this", "watch",
];

const DOMAIN_KEYWORDS: &[&str] = &[
    "oil", "sanction", "government", "election", "inflation", "investment", "contract",
    "agreement", "production", "export", "import", "economy", "tender", "procurement",
    "humanitarian", "million", "billion", "percent", "minister", "company", "bank", "debt",
    "license", "crude",
];

const ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "gen.", "gov.", "sen.", "rep.", "st.", "no.", "inc.", "corp.",
    "co.", "ltd.", "jan.", "feb.", "aug.", "sept.", "oct.", "nov.", "dec.", "u.s.", "u.n.",
    "e.g.", "i.e.", "vs.", "approx.",
];

const SPANISH_MARKERS: &[&str] = &[
    " de ", " la ", " el ", " en ", " para ", " con ", " una ", " un ", " y ", " los ", " las ",
    " del ", " gobierno ", " política ", " politica ",
];

static RE_ACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(approved|announced|signed|suspended|launched|met|agreed|allowed|imposed|lifted|expanded|cut|raised|reviewed|reformed|invested|sanctioned|licensed|exported|inflation|debt|election|resigned|released|resale|contract|seeking|sold|rejected)\b",
    )
    .expect("action regex")
});
static RE_ACCENTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[áéíóúñ¿¡]").expect("accent regex"));

/// Split after `.`, `!` or `?` when followed by whitespace and an uppercase
/// letter or digit.
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = normalize_text(text);
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = Vec::new();
    let mut start = 0;

    for i in 0..chars.len() {
        let (pos, c) = chars[i];
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let next_is_space = chars.get(i + 1).is_some_and(|(_, n)| n.is_whitespace());
        let after = chars.get(i + 2).map(|(_, n)| *n);
        if next_is_space && after.is_some_and(|n| n.is_uppercase() || n.is_ascii_digit() || n == '"') {
            let end = pos + c.len_utf8();
            let s = text[start..end].trim();
            if !s.is_empty() {
                out.push(s.to_string());
            }
            start = end;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }
    out
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Share of letters among alphanumerics; tickers and tables score low.
fn letter_ratio(s: &str) -> f64 {
    let alnum = s.chars().filter(|c| c.is_alphanumeric()).count();
    if alnum == 0 {
        return 0.0;
    }
    let letters = s.chars().filter(|c| c.is_alphabetic()).count();
    letters as f64 / alnum as f64
}

pub fn is_noise_sentence(s: &str) -> bool {
    let low = s.to_lowercase();
    HARD_NOISE.iter().any(|n| low.contains(n)) || letter_ratio(s) < 0.6
}

pub fn is_fragment(s: &str) -> bool {
    if word_count(s) < 6 || s.matches('|').count() >= 2 {
        return true;
    }
    let low = s.to_lowercase();
    let last = low.split_whitespace().last().unwrap_or_default();
    ABBREVIATIONS.contains(&last)
}

/// Passes every hard filter.
pub fn is_usable_sentence(s: &str, min_chars: usize) -> bool {
    s.chars().count() >= min_chars && !is_boilerplate(s) && !is_noise_sentence(s) && !is_fragment(s)
}

/// Rank for a usable sentence: longer and more on-topic is better.
pub fn sentence_quality(s: &str) -> i32 {
    let low = s.to_lowercase();
    let words = word_count(s);
    let mut q = 10;
    if words >= 10 {
        q += 5;
    }
    if words >= 16 {
        q += 3;
    }
    if words > 60 {
        q -= 6;
    }
    let topical = DOMAIN_KEYWORDS.iter().filter(|k| low.contains(*k)).count().min(3);
    q += 3 * topical as i32;
    let noise = SOFT_NOISE.iter().filter(|k| low.contains(*k)).count();
    q -= 4 * noise as i32;
    q
}

/// Best sentence of `text` that does not just restate `title`.
/// Ties keep the earliest sentence.
pub fn best_sentence(text: &str, title: &str, min_chars: usize, title_threshold: f64) -> Option<String> {
    let tkey = title_key(title);
    let mut best: Option<(i32, String)> = None;
    for s in split_sentences(text) {
        if !is_usable_sentence(&s, min_chars) {
            continue;
        }
        if !tkey.is_empty() && title_similarity(&title_key(&s), &tkey) >= title_threshold {
            continue;
        }
        let q = sentence_quality(&s);
        if best.as_ref().map_or(true, |(bq, _)| q > *bq) {
            best = Some((q, s));
        }
    }
    best.map(|(_, s)| s)
}

pub fn has_action_signal(text: &str) -> bool {
    RE_ACTION.is_match(&text.to_lowercase())
}

/// Accented characters or three or more common Spanish function words.
pub fn is_likely_non_english(text: &str) -> bool {
    let value = format!(" {} ", normalize_text(text).to_lowercase());
    if RE_ACCENTED.is_match(&value) {
        return true;
    }
    SPANISH_MARKERS.iter().filter(|m| value.contains(*m)).count() >= 3
}

/// Long, capitalized-word-heavy text with no action verb reads like a headline.
pub fn looks_like_title_fragment(text: &str) -> bool {
    let value = normalize_text(text);
    if value.chars().count() < 60 || has_action_signal(&value) {
        return false;
    }
    let words: Vec<&str> = value.split_whitespace().collect();
    let capitalized = words
        .iter()
        .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
        .count();
    capitalized >= (words.len() / 2).max(6) || (value.contains(':') && words.len() >= 10)
}

/// Too short or carrying date/scrape residue to stand as a sentence.
pub fn is_noisy_text(text: &str) -> bool {
    const TOKENS: &[&str] = &[
        "published time",
        "markdown content",
        "url source",
        "(...)",
        "newsletter",
        "recent reporting",
    ];
    let low = text.to_lowercase();
    text.chars().count() < 45 || TOKENS.iter().any(|t| low.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminal_punctuation() {
        let s = "PDVSA raised output. Exports rose 5%! Will it last? 2026 looks tight.";
        assert_eq!(
            split_sentences(s),
            vec!["PDVSA raised output.", "Exports rose 5%!", "Will it last?", "2026 looks tight."]
        );
    }

    #[test]
    fn does_not_split_inside_decimals_or_lowercase_continuations() {
        let s = "Inflation hit 3.5 percent in January. analysts disagree. Prices rose.";
        assert_eq!(
            split_sentences(s),
            vec!["Inflation hit 3.5 percent in January. analysts disagree.", "Prices rose."]
        );
    }

    #[test]
    fn noise_and_fragments_rejected() {
        assert!(is_noise_sentence("Subscribe to read the full story about Venezuela today."));
        assert!(is_noise_sentence("BVC 1234 5678 9012 3456 +0.5% 12.3 44.1"));
        assert!(is_fragment("Oil up."));
        assert!(is_fragment("Home | News | Venezuela | Oil markets today and tomorrow"));
        assert!(is_fragment("The deal was announced by Gen."));
        assert!(!is_fragment("The government approved a new oil licensing framework on Monday."));
    }

    #[test]
    fn best_sentence_skips_title_restatement() {
        let title = "Venezuela approves new oil licensing framework";
        let text = "Venezuela approves new oil licensing framework. \
                    The framework lets foreign companies operate joint ventures with PDVSA under new contract terms. \
                    Click here to watch the video.";
        let best = best_sentence(text, title, 35, 0.8).unwrap();
        assert!(best.starts_with("The framework lets foreign companies"));
    }

    #[test]
    fn best_sentence_none_when_all_rejected() {
        assert!(best_sentence("Sign in. Cookie settings.", "x", 35, 0.8).is_none());
        assert!(best_sentence("", "x", 35, 0.8).is_none());
    }

    #[test]
    fn language_and_headline_heuristics() {
        assert!(is_likely_non_english("El gobierno anunció medidas para la economía"));
        assert!(!is_likely_non_english("The government announced new measures for the economy"));
        assert!(looks_like_title_fragment(
            "Venezuela Oil Output Climbs To Highest Level In Five Years Amid Chevron Expansion"
        ));
        assert!(!looks_like_title_fragment("Chevron signed a new supply contract with PDVSA on Monday"));
    }
}
