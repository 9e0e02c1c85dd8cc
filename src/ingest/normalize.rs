//! Text normalization applied wherever feed or article text is read.
//!
//! Every function here is total: any input, including empty strings and
//! HTML-laden snippets, yields a (possibly empty) single-line string.

use once_cell::sync::Lazy;
use regex::Regex;

/// Aggregator disclaimers deleted wherever they appear.
pub const BOILERPLATE: &[&str] = &[
    "Comprehensive up-to-date news coverage, aggregated from sources all over the world by Google News",
];

static RE_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<!--.*?-->|</?[a-z][^<>]*>|<![a-z][^<>]*>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));
static RE_BOILERPLATE: Lazy<Regex> = Lazy::new(|| {
    let alts: Vec<String> = BOILERPLATE.iter().map(|b| regex::escape(b)).collect();
    Regex::new(&format!(r"(?i)(?:{})\.?", alts.join("|"))).expect("boilerplate regex")
});
static RE_TRAILING_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^()]*\)\s*$").expect("paren regex"));

/// Decode entities, strip tags, fold typographic punctuation, drop boilerplate
/// and collapse whitespace to a single trimmed line. Idempotent.
pub fn normalize_text(s: &str) -> String {
    let mut out = s.to_string();
    // A pass can expose new entities or tags (double-encoded feeds), so run to a fixpoint.
    loop {
        let next = normalize_once(&out);
        if next == out {
            break;
        }
        out = next;
    }
    out
}

fn normalize_once(s: &str) -> String {
    // 1) Entities, tags and invisible characters until stable. A zero-width
    // character can hide an entity, and an entity can decode to one.
    let mut out = s.to_string();
    loop {
        let decoded = html_escape::decode_html_entities(&out).to_string();
        let stripped = strip_invisible(&RE_TAGS.replace_all(&decoded, " "));
        if stripped == out {
            break;
        }
        out = stripped;
    }

    // 2) Typographic quotes and dashes to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{2013}', '\u{2014}'], "-")
        .replace('\u{2026}', "...");

    // 3) Boilerplate is removed outright
    out = RE_BOILERPLATE.replace_all(&out, " ").to_string();

    // 4) One line, single spaces
    RE_WS.replace_all(&out, " ").trim().to_string()
}

fn strip_invisible(s: &str) -> String {
    s.replace('\u{00A0}', " ")
        .replace(['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'], "")
}

/// True when nothing but aggregator boilerplate (or nothing at all) remains.
pub fn is_boilerplate(s: &str) -> bool {
    normalize_text(s)
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .is_empty()
}

/// Headline without the trailing publisher (` - Reuters`), site suffix
/// (` | Site`) or trailing parenthetical. Falls back to the normalized input.
pub fn clean_title(title: &str) -> String {
    let base = normalize_text(title);
    let mut t = base.clone();

    if let Some(idx) = t.find(" | ") {
        t.truncate(idx);
    }
    if let Some(idx) = t.rfind(" - ") {
        let tail = &t[idx + 3..];
        if !tail.is_empty() && tail.chars().count() <= 40 && tail.split_whitespace().count() <= 5 {
            t.truncate(idx);
        }
    }
    t = RE_TRAILING_PAREN.replace(&t, "").to_string();

    let t = t.trim().to_string();
    if t.is_empty() {
        base
    } else {
        t
    }
}

/// Cut to at most `max` chars, preferring a word boundary, with a trailing ellipsis.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let head: String = s.chars().take(max.saturating_sub(1)).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(idx) if head[..idx].chars().count() >= max / 2 => &head[..idx],
        _ => head.as_str(),
    };
    let cut = cut.trim_end_matches(|c: char| c.is_whitespace() || ",;:-".contains(c));
    format!("{cut}…")
}
