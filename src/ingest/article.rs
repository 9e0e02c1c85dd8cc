//! Best-effort article text for the summary chain: meta description, first
//! substantive paragraph and joined body text. Any field may be missing.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::ingest::normalize::{is_boilerplate, normalize_text};
use crate::synth::sentences::split_sentences;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleText {
    pub meta_description: Option<String>,
    pub first_paragraph: Option<String>,
    pub full_text: Option<String>,
}

impl ArticleText {
    pub fn is_empty(&self) -> bool {
        self.meta_description.is_none() && self.first_paragraph.is_none() && self.full_text.is_none()
    }
}

#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ArticleText>;
}

pub struct HttpArticleFetcher {
    client: reqwest::Client,
}

impl HttpArticleFetcher {
    /// The client should carry its own timeout (see `feed::http_client`).
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    async fn fetch(&self, url: &str) -> Result<ArticleText> {
        let html = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("article http get {url}"))?
            .text()
            .await
            .context("article http .text()")?;
        Ok(extract_article_text(&html))
    }
}

static SEL_META: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="description"], meta[property="og:description"], meta[name="twitter:description"]"#)
        .expect("meta selector")
});
static SEL_P: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("p selector"));

static RE_DATELINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-ZÁÉÍÓÚÑ][A-Za-zÁÉÍÓÚÑáéíóúñ\s\.\-]{2,40}\s+\([^\)]+\)\s+[-—]\s+")
        .expect("dateline regex")
});
static RE_BYLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:by|por)\s+\S.{0,80}$|^\s*(?:reuters|ap|afp|efe)\s*$").expect("byline regex")
});

const NOISE_MARKERS: &[&str] = &[
    "cookies",
    "subscribe",
    "suscríb",
    "sign up",
    "sign in",
    "iniciar sesión",
    "accept all",
    "privacy policy",
    "terms of use",
    "newsletter",
    "read more",
    "cookie policy",
    "all rights reserved",
    "reset password",
    "skip to content",
    "just a moment",
    "performing security verification",
];

const MIN_PARAGRAPH_CHARS: usize = 80;

/// Pull the three text shapes out of an article page.
pub fn extract_article_text(html: &str) -> ArticleText {
    let doc = Html::parse_document(html);

    let meta_description = doc
        .select(&SEL_META)
        .filter_map(|el| el.value().attr("content"))
        .map(normalize_text)
        .find(|s| !s.is_empty() && !is_boilerplate(s) && !looks_like_noise(s));

    let paragraphs: Vec<String> = doc
        .select(&SEL_P)
        .map(|p| normalize_text(&p.text().collect::<Vec<_>>().join(" ")))
        .filter(|p| !p.is_empty())
        .collect();

    let first_paragraph = first_substantive_paragraph(&paragraphs);

    let body: Vec<&str> = paragraphs
        .iter()
        .map(String::as_str)
        .filter(|p| !looks_like_noise(p) && !is_byline(p) && !is_boilerplate(p))
        .collect();
    let full_text = (!body.is_empty()).then(|| normalize_text(&body.join(" ")));

    ArticleText {
        meta_description,
        first_paragraph,
        full_text,
    }
}

/// First paragraph that is long, not a byline or chrome, and has two sentences.
pub fn first_substantive_paragraph(paragraphs: &[String]) -> Option<String> {
    paragraphs
        .iter()
        .map(|p| normalize_text(p))
        .find(|p| {
            p.chars().count() >= MIN_PARAGRAPH_CHARS
                && !is_boilerplate(p)
                && !is_byline(p)
                && !looks_like_noise(p)
                && split_sentences(p).len() >= 2
        })
}

fn is_byline(p: &str) -> bool {
    RE_DATELINE.is_match(p) || RE_BYLINE.is_match(p)
}

pub(crate) fn looks_like_noise(p: &str) -> bool {
    let low = p.to_lowercase();
    if low.matches("http").count() >= 2 {
        return true;
    }
    if low.matches(" |").count() >= 3 || low.matches(" - ").count() >= 6 {
        return true;
    }
    if low.contains("title:") || low.contains("url source:") || low.contains("markdown content:") {
        return true;
    }
    NOISE_MARKERS.iter().any(|m| low.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
<meta name="description" content="Venezuela&#39;s oil minister outlined new export licences for partners.">
</head><body>
<p>By Jane Doe</p>
<p>Subscribe to our newsletter for daily updates on Latin America and beyond, delivered every morning.</p>
<p>Venezuela's state oil company PDVSA signed two supply contracts on Monday. The deals cover crude shipments to Asian refiners through the end of the year.</p>
<p>Officials declined to comment.</p>
</body></html>"#;

    #[test]
    fn extracts_meta_and_first_paragraph() {
        let a = extract_article_text(PAGE);
        assert_eq!(
            a.meta_description.as_deref(),
            Some("Venezuela's oil minister outlined new export licences for partners.")
        );
        let p = a.first_paragraph.unwrap();
        assert!(p.starts_with("Venezuela's state oil company PDVSA"), "got {p}");
        let full = a.full_text.unwrap();
        assert!(!full.contains("Subscribe"));
        assert!(full.contains("Officials declined"));
    }

    #[test]
    fn empty_page_yields_nothing() {
        let a = extract_article_text("<html><body></body></html>");
        assert!(a.is_empty());
    }

    #[test]
    fn short_or_single_sentence_paragraphs_skipped() {
        let ps = vec![
            "Too short.".to_string(),
            "One very long sentence without any terminal punctuation that just keeps going on and on about Caracas".to_string(),
        ];
        assert!(first_substantive_paragraph(&ps).is_none());
    }
}
