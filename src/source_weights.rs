//! # Source Weights
//!
//! Ordered table mapping source domains (e.g. "worldbank.org", "reliefweb.int")
//! to priority weights. A weight of `1.0` is neutral; anything above it marks a
//! preferred source and feeds the source-priority sub-score.
//!
//! - Loads from TOML as part of the brief config (`[[source_weights]]`).
//! - Case-insensitive lookup; `www.` and surrounding noise are stripped.
//! - Aliases let one entry cover mirror domains (e.g. "news.un.org" → "un.org").
//! - Lookup order: table order, first substring match wins.
//! - Includes a built-in `default_seed()` with the usual development-finance hosts.

use serde::{Deserialize, Serialize};

/// Neutral weight for domains that are not listed.
pub const NEUTRAL_WEIGHT: f64 = 1.0;

/// One row of the priority table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceWeight {
    /// Canonical host fragment, matched as a substring of the entry's domain.
    pub domain: String,
    /// Raw priority weight; `> 1.0` boosts, `<= 1.0` contributes nothing.
    pub weight: f64,
    /// Extra host fragments resolving to this row.
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Ordered source-priority table. Serialized as a plain array so that
/// `[[source_weights]]` blocks in TOML keep their file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceWeightsConfig {
    pub entries: Vec<SourceWeight>,
}

impl SourceWeightsConfig {
    /// Raw weight for a source domain.
    ///
    /// Rows are scanned in table order; the first row whose domain or alias is a
    /// substring of the normalized input wins. Unlisted domains get `NEUTRAL_WEIGHT`.
    pub fn weight_for(&self, source_domain: &str) -> f64 {
        let s = normalize(source_domain);
        if s.is_empty() {
            return NEUTRAL_WEIGHT;
        }

        for row in &self.entries {
            let hit = std::iter::once(&row.domain)
                .chain(row.aliases.iter())
                .map(|d| normalize(d))
                .any(|d| !d.is_empty() && s.contains(&d));
            if hit {
                return sanitize(row.weight);
            }
        }

        NEUTRAL_WEIGHT
    }

    /// Source-priority sub-score in `[0.0, 1.0]`.
    ///
    /// Weights above neutral are scaled by `span` (`1.0 + span` saturates);
    /// neutral and below score zero.
    pub fn priority_score(&self, source_domain: &str, span: f64) -> f64 {
        let w = self.weight_for(source_domain);
        if w <= NEUTRAL_WEIGHT {
            return 0.0;
        }
        clamp01((w - NEUTRAL_WEIGHT) / span.max(f64::EPSILON))
    }

    /// Built-in seed with multilateral, humanitarian and wire-service hosts.
    /// Used when no table is configured.
    pub fn default_seed() -> Self {
        let mut entries = Vec::new();
        for (domain, weight, aliases) in [
            ("worldbank.org", 1.4, &["documents.worldbank.org"][..]),
            ("reliefweb.int", 1.4, &[][..]),
            ("iadb.org", 1.35, &[][..]),
            ("imf.org", 1.35, &[][..]),
            ("undp.org", 1.3, &[][..]),
            ("un.org", 1.3, &["ungm.org", "devbusiness.un.org"][..]),
            ("caf.com", 1.25, &[][..]),
            ("reuters.com", 1.2, &[][..]),
            ("apnews.com", 1.15, &[][..]),
            ("bloomberg.com", 1.15, &[][..]),
        ] {
            entries.push(SourceWeight {
                domain: domain.to_string(),
                weight,
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
            });
        }
        Self { entries }
    }
}

/// Normalize a host: trim, lowercase, drop scheme, `www.` and any path.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_ascii_lowercase();
    for scheme in ["https://", "http://"] {
        if let Some(rest) = out.strip_prefix(scheme) {
            out = rest.to_string();
        }
    }
    if let Some(rest) = out.strip_prefix("www.") {
        out = rest.to_string();
    }
    if let Some(idx) = out.find('/') {
        out.truncate(idx);
    }
    out
}

fn sanitize(w: f64) -> f64 {
    if w.is_finite() {
        w.max(0.0)
    } else {
        NEUTRAL_WEIGHT
    }
}

/// Clamp to [0.0, 1.0].
fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SourceWeightsConfig {
        SourceWeightsConfig::default_seed()
    }

    #[test]
    fn substring_match() {
        let c = cfg();
        assert!((c.weight_for("worldbank.org") - 1.4).abs() < 1e-9);
        assert!((c.weight_for("blogs.worldbank.org") - 1.4).abs() < 1e-9);
    }

    #[test]
    fn alias_match() {
        let c = cfg();
        assert!((c.weight_for("ungm.org") - 1.3).abs() < 1e-9);
    }

    #[test]
    fn www_and_case_are_ignored() {
        let c = cfg();
        assert!((c.weight_for("WWW.ReliefWeb.INT") - 1.4).abs() < 1e-9);
        assert!((c.weight_for("https://www.reliefweb.int/report/x") - 1.4).abs() < 1e-9);
    }

    #[test]
    fn neutral_weight_used() {
        let c = cfg();
        assert_eq!(c.weight_for("totally-unknown.example"), NEUTRAL_WEIGHT);
        assert_eq!(c.weight_for(""), NEUTRAL_WEIGHT);
        assert_eq!(c.priority_score("totally-unknown.example", 0.5), 0.0);
    }

    #[test]
    fn first_row_wins() {
        let c = SourceWeightsConfig {
            entries: vec![
                SourceWeight {
                    domain: "un.org".into(),
                    weight: 1.1,
                    aliases: vec![],
                },
                SourceWeight {
                    domain: "news.un.org".into(),
                    weight: 1.5,
                    aliases: vec![],
                },
            ],
        };
        assert!((c.weight_for("news.un.org") - 1.1).abs() < 1e-9);
    }

    #[test]
    fn priority_score_saturates() {
        let c = cfg();
        assert!((c.priority_score("worldbank.org", 0.5) - 0.8).abs() < 1e-9);
        let big = SourceWeightsConfig {
            entries: vec![SourceWeight {
                domain: "x.org".into(),
                weight: 3.0,
                aliases: vec![],
            }],
        };
        assert_eq!(big.priority_score("x.org", 0.5), 1.0);
    }
}
