//! Parsed feed records

use serde::{Deserialize, Serialize};

/// One trending search entry from a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    /// Search term.
    pub title: String,
    /// 1-based position in the feed.
    pub rank: usize,
    /// Approximate search volume as reported (e.g. `"200K+"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic: Option<String>,
    /// Publication timestamp as it appears in the feed (RFC 2822).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_source: Option<String>,
    /// Related news coverage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub news: Vec<NewsItem>,
}

impl TrendRecord {
    pub fn new(title: impl Into<String>, rank: usize) -> Self {
        Self {
            title: title.into(),
            rank,
            traffic: None,
            published: None,
            picture: None,
            picture_source: None,
            news: Vec::new(),
        }
    }

    pub fn traffic(mut self, traffic: impl Into<String>) -> Self {
        self.traffic = Some(traffic.into());
        self
    }

    /// Lower bound of the traffic estimate, e.g. `"200K+"` → `200_000`.
    pub fn traffic_estimate(&self) -> Option<u64> {
        let raw = self.traffic.as_deref()?.trim().trim_end_matches('+');
        let raw = raw.replace(',', "");
        let (digits, multiplier) = match raw.chars().last()? {
            'K' | 'k' => (&raw[..raw.len() - 1], 1_000),
            'M' | 'm' => (&raw[..raw.len() - 1], 1_000_000),
            'B' | 'b' => (&raw[..raw.len() - 1], 1_000_000_000),
            _ => (raw.as_str(), 1),
        };
        digits
            .parse::<u64>()
            .ok()
            .and_then(|n| n.checked_mul(multiplier))
    }
}

/// A news article attached to a trend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}
