// src/sentiment.rs
//! Headline tone from a small weighted lexicon (`sentiment_lexicon.json`).
//!
//! Two-word phrases ("sanctions relief") are tried before single words and
//! consume both tokens. A negator up to three tokens back flips a term's sign.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::analyze::types::Sentiment;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../sentiment_lexicon.json")).expect("valid sentiment lexicon")
});

const NEGATION_WINDOW: usize = 3;

const NEGATORS: &[&str] = &[
    "not", "no", "never", "without", "isn't", "wasn't", "aren't", "won't", "can't", "cannot",
    "fails", "failed", "sin", "nunca",
];

/// Lexicon result for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToneScore {
    pub score: i32,
    /// Lexicon terms found (a phrase counts once).
    pub terms: usize,
    pub tokens: usize,
}

impl ToneScore {
    pub fn sentiment(&self) -> Sentiment {
        match self.score {
            s if s > 0 => Sentiment::Positive,
            s if s < 0 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

/// Lowercase word tokens; inner apostrophes kept so "isn't" stays one token.
fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn negated(tokens: &[String], at: usize) -> bool {
    tokens[at.saturating_sub(NEGATION_WINDOW)..at]
        .iter()
        .any(|t| NEGATORS.contains(&t.as_str()))
}

pub fn tone(text: &str) -> ToneScore {
    let toks = tokens(text);
    let mut out = ToneScore {
        tokens: toks.len(),
        ..Default::default()
    };

    let mut i = 0;
    while i < toks.len() {
        let phrase = toks.get(i + 1).and_then(|next| {
            LEXICON
                .get(&format!("{} {}", toks[i], next))
                .map(|w| (*w, 2))
        });
        let Some((weight, width)) = phrase.or_else(|| LEXICON.get(&toks[i]).map(|w| (*w, 1))) else {
            i += 1;
            continue;
        };
        out.score += if negated(&toks, i) { -weight } else { weight };
        out.terms += 1;
        i += width;
    }
    out
}

/// Sign of the lexicon score.
pub fn classify(text: &str) -> Sentiment {
    tone(text).sentiment()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_tone() {
        assert_eq!(classify("Oil output recovers as exports grow"), Sentiment::Positive);
        assert_eq!(classify("Blackout deepens crisis in Zulia"), Sentiment::Negative);
        assert_eq!(classify("Ministry publishes calendar"), Sentiment::Neutral);
    }

    #[test]
    fn negators_flip_within_window() {
        assert!(tone("talks improve").score > 0);
        assert!(tone("talks did not improve").score < 0);
        assert_eq!(classify("no agreement reached"), Sentiment::Negative);
        assert_eq!(classify("sin acuerdo, no hubo mucho progress"), Sentiment::Negative);
        // out of window
        assert!(tone("not that the long awaited talks improve").score > 0);
    }

    #[test]
    fn phrases_beat_their_words() {
        // "sanctions" alone is negative; the phrase is positive and counted once
        let t = tone("US grants sanctions relief to PDVSA partners");
        assert_eq!(t.terms, 1);
        assert!(t.score > 0);
        assert_eq!(classify("Caracas hit by power cuts"), Sentiment::Negative);
    }

    #[test]
    fn empty_text_is_neutral() {
        assert_eq!(tone(""), ToneScore::default());
        assert_eq!(classify(""), Sentiment::Neutral);
    }
}
