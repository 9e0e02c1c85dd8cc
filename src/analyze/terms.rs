//! Term matching over lowercased text.
//!
//! Configured terms are case-insensitive substrings, except acronyms
//! (`rfp`, `tor`, ...) which must stand alone as words.

use crate::config::BriefConfig;

/// True if `text` contains `term` with non-alphanumeric characters (or the
/// string edges) on both sides.
pub fn contains_word(text: &str, term: &str) -> bool {
    find_bounded(text, term, true)
}

/// Like `contains_word`, but only the left edge must be a boundary, so
/// "sanction" matches "sanctions" and "law" does not match "flaw".
pub fn starts_word(text: &str, term: &str) -> bool {
    find_bounded(text, term, false)
}

fn find_bounded(text: &str, term: &str, right_boundary: bool) -> bool {
    if term.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(pos) = text[from..].find(term) {
        let start = from + pos;
        let end = start + term.len();
        let left_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let right_ok = !right_boundary
            || text[end..].chars().next().map_or(true, |c| !c.is_alphanumeric());
        if left_ok && right_ok {
            return true;
        }
        // advance by one char to find overlapping occurrences
        from = start + text[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Match one configured term against lowercased `text`.
pub fn contains_term(text: &str, term: &str, cfg: &BriefConfig) -> bool {
    if term.is_empty() {
        return false;
    }
    if cfg.acronym_terms.iter().any(|a| a == term) {
        contains_word(text, term)
    } else {
        text.contains(term)
    }
}

/// Number of distinct terms from `terms` present in `text`.
pub fn count_hits(text: &str, terms: &[String], cfg: &BriefConfig) -> usize {
    terms.iter().filter(|t| contains_term(text, t, cfg)).count()
}

pub fn any_hit(text: &str, terms: &[String], cfg: &BriefConfig) -> bool {
    terms.iter().any(|t| contains_term(text, t, cfg))
}

/// Terms from `terms` present in `text`, in list order.
pub fn matched_terms<'a>(text: &str, terms: &'a [String], cfg: &BriefConfig) -> Vec<&'a str> {
    terms
        .iter()
        .filter(|t| contains_term(text, t, cfg))
        .map(String::as_str)
        .collect()
}
