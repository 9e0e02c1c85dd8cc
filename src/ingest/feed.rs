use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::config::feeds::FeedSpec;
use crate::ingest::normalize::normalize_text;
use crate::ingest::types::{Entry, FeedSource};

pub const USER_AGENT: &str = concat!("country-brief/", env!("CARGO_PKG_VERSION"));

/* ----------------------------
RSS 2.0
---------------------------- */

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}
#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "content:encoded", alias = "encoded")]
    content: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "dc:date", alias = "date")]
    dc_date: Option<String>,
    source: Option<RssSource>,
}
#[derive(Debug, Deserialize)]
struct RssSource {
    #[serde(rename = "@url")]
    url: Option<String>,
}

/* ----------------------------
Atom 1.0
---------------------------- */

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}
#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
    published: Option<String>,
    updated: Option<String>,
}
#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}
#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    fn alternate_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| self.links.first())
            .and_then(|l| l.href.as_deref())
    }
}

/// Parse a date in any of the formats feeds use in practice. `None` means undated.
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(dt) = OffsetDateTime::parse(s, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(s, &Rfc3339))
        .ok()
        .and_then(|dt| Utc.timestamp_opt(dt.unix_timestamp(), dt.nanosecond()).single())
    {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%a, %d %b %Y %H:%M:%S %z", "%Y-%m-%d %H:%M:%S %z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%a, %d %b %Y %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Lowercased host without `www.`; empty when the URL does not parse.
pub fn domain_of(raw: &str) -> String {
    url::Url::parse(raw.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .map(|h| h.strip_prefix("www.").map(str::to_string).unwrap_or(h))
        .unwrap_or_default()
}

pub struct FeedProvider {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture { url: String, body: String },
    Http { url: String, client: reqwest::Client },
}

impl FeedProvider {
    /// Serve a canned document as if it had been fetched from `url`.
    pub fn from_fixture(url: &str, body: &str) -> Self {
        Self {
            name: domain_of(url),
            mode: Mode::Fixture {
                url: url.to_string(),
                body: body.to_string(),
            },
        }
    }

    pub fn from_spec(spec: &FeedSpec, client: reqwest::Client) -> Self {
        Self {
            name: spec.display_name(),
            mode: Mode::Http {
                url: spec.url.clone(),
                client,
            },
        }
    }

    /// Parse an RSS or Atom document fetched from `feed_url`.
    pub fn parse_entries(body: &str, feed_url: &str) -> Result<Vec<Entry>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(body);
        let feed_domain = domain_of(feed_url);

        let out = if is_atom(&xml_clean) {
            let feed: AtomFeed = from_str(&xml_clean).context("parsing atom xml")?;
            feed.entries
                .into_iter()
                .map(|e| {
                    let date = e.published.as_deref().or(e.updated.as_deref());
                    Entry {
                        title: e.title.as_ref().map(|t| normalize_text(&t.value)).unwrap_or_default(),
                        link: e.alternate_link().unwrap_or_default().trim().to_string(),
                        summary: e
                            .summary
                            .as_ref()
                            .map(|t| normalize_text(&t.value))
                            .unwrap_or_default(),
                        content: e.content.map(|t| t.value).filter(|s| !s.trim().is_empty()),
                        published_at: date.and_then(parse_feed_date),
                        source_url: feed_url.to_string(),
                        source_domain: feed_domain.clone(),
                    }
                })
                .collect::<Vec<_>>()
        } else {
            let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;
            rss.channel
                .items
                .into_iter()
                .map(|it| {
                    let source_domain = it
                        .source
                        .as_ref()
                        .and_then(|s| s.url.as_deref())
                        .map(domain_of)
                        .filter(|d| !d.is_empty())
                        .unwrap_or_else(|| feed_domain.clone());
                    let date = it.pub_date.as_deref().or(it.dc_date.as_deref());
                    Entry {
                        title: normalize_text(it.title.as_deref().unwrap_or_default()),
                        link: it.link.as_deref().unwrap_or_default().trim().to_string(),
                        summary: normalize_text(it.description.as_deref().unwrap_or_default()),
                        content: it.content.filter(|s| !s.trim().is_empty()),
                        published_at: date.and_then(parse_feed_date),
                        source_url: feed_url.to_string(),
                        source_domain,
                    }
                })
                .collect::<Vec<_>>()
        };

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("brief_feed_parse_ms").record(ms);
        counter!("brief_entries_parsed_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl FeedSource for FeedProvider {
    async fn fetch_entries(&self) -> Result<Vec<Entry>> {
        match &self.mode {
            Mode::Fixture { url, body } => Self::parse_entries(body, url),
            Mode::Http { url, client } => {
                let body = client
                    .get(url.as_str())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .with_context(|| format!("feed http get {url}"))?
                    .text()
                    .await
                    .context("feed http .text()")?;
                Self::parse_entries(&body, url)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Shared HTTP client for feeds and article pages.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .user_agent(USER_AGENT)
        .build()
        .context("building http client")
}

fn is_atom(xml: &str) -> bool {
    let feed = xml.find("<feed");
    let rss = xml.find("<rss").or_else(|| xml.find("<channel"));
    match (feed, rss) {
        (Some(f), Some(r)) => f < r,
        (Some(_), None) => true,
        _ => false,
    }
}

// HTML entities are not valid XML; feeds emit them anyway.
const XML_ENTITY_FIXES: &[(&str, &str)] = &[
    ("&nbsp;", "&#160;"),
    ("&ndash;", "-"),
    ("&mdash;", "-"),
    ("&ldquo;", "\""),
    ("&rdquo;", "\""),
    ("&lsquo;", "'"),
    ("&rsquo;", "'"),
    ("&hellip;", "..."),
    ("&aacute;", "á"),
    ("&eacute;", "é"),
    ("&iacute;", "í"),
    ("&oacute;", "ó"),
    ("&uacute;", "ú"),
    ("&ntilde;", "ñ"),
];

fn scrub_html_entities_for_xml(s: &str) -> String {
    XML_ENTITY_FIXES
        .iter()
        .fold(s.to_string(), |acc, &(from, to)| acc.replace(from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn dates_in_common_formats() {
        let a = parse_feed_date("Tue, 17 Feb 2026 08:30:00 GMT").unwrap();
        assert_eq!((a.year(), a.month(), a.day()), (2026, 2, 17));
        let b = parse_feed_date("2026-02-17T08:30:00Z").unwrap();
        assert_eq!(a, b);
        let c = parse_feed_date("2026-02-17").unwrap();
        assert_eq!(c.day(), 17);
        assert!(parse_feed_date("last tuesday").is_none());
        assert!(parse_feed_date("").is_none());
    }

    #[test]
    fn domain_strips_www() {
        assert_eq!(domain_of("https://www.WorldBank.org/en/news"), "worldbank.org");
        assert_eq!(domain_of("not a url"), "");
    }

    #[test]
    fn atom_detection() {
        assert!(is_atom(r#"<?xml version="1.0"?><feed xmlns="http://www.w3.org/2005/Atom">"#));
        assert!(!is_atom(r#"<rss version="2.0"><channel>"#));
    }
}
