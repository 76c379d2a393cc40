//! Feed request options

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, TrendsError};

/// Trend category filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Autos,
    Beauty,
    Business,
    Climate,
    Entertainment,
    Food,
    Games,
    Health,
    Hobbies,
    Jobs,
    Law,
    Other,
    Pets,
    Politics,
    Science,
    Shopping,
    Sports,
    Technology,
    Travel,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 20] = [
        Category::All,
        Category::Autos,
        Category::Beauty,
        Category::Business,
        Category::Climate,
        Category::Entertainment,
        Category::Food,
        Category::Games,
        Category::Health,
        Category::Hobbies,
        Category::Jobs,
        Category::Law,
        Category::Other,
        Category::Pets,
        Category::Politics,
        Category::Science,
        Category::Shopping,
        Category::Sports,
        Category::Technology,
        Category::Travel,
    ];

    /// User-facing name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Autos => "autos",
            Category::Beauty => "beauty",
            Category::Business => "business",
            Category::Climate => "climate",
            Category::Entertainment => "entertainment",
            Category::Food => "food",
            Category::Games => "games",
            Category::Health => "health",
            Category::Hobbies => "hobbies",
            Category::Jobs => "jobs",
            Category::Law => "law",
            Category::Other => "other",
            Category::Pets => "pets",
            Category::Politics => "politics",
            Category::Science => "science",
            Category::Shopping => "shopping",
            Category::Sports => "sports",
            Category::Technology => "technology",
            Category::Travel => "travel",
        }
    }

    /// Code sent on the wire, or `None` for the unfiltered feed.
    pub fn wire_code(&self) -> Option<&'static str> {
        match self {
            Category::All => None,
            Category::Technology => Some("tech"),
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TrendsError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted || c.wire_code() == Some(wanted.as_str()))
            .ok_or_else(|| TrendsError::InvalidParameter(format!("unknown category '{s}'")))
    }
}

/// Look-back window of the feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "4h")]
    FourHours,
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "48h")]
    TwoDays,
    #[serde(rename = "7d")]
    Week,
}

impl TimeWindow {
    pub fn hours(&self) -> u32 {
        match self {
            TimeWindow::FourHours => 4,
            TimeWindow::Day => 24,
            TimeWindow::TwoDays => 48,
            TimeWindow::Week => 168,
        }
    }

    pub fn from_hours(hours: u32) -> Result<Self> {
        match hours {
            4 => Ok(TimeWindow::FourHours),
            24 => Ok(TimeWindow::Day),
            48 => Ok(TimeWindow::TwoDays),
            168 => Ok(TimeWindow::Week),
            other => Err(TrendsError::InvalidParameter(format!(
                "unsupported time window {other}h (expected 4, 24, 48 or 168)"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::FourHours => "4h",
            TimeWindow::Day => "24h",
            TimeWindow::TwoDays => "48h",
            TimeWindow::Week => "7d",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = TrendsError;

    /// Accepts `4h`/`24h`/`48h`/`7d` or a bare hour count.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "4h" => Ok(TimeWindow::FourHours),
            "24h" | "1d" => Ok(TimeWindow::Day),
            "48h" | "2d" => Ok(TimeWindow::TwoDays),
            "7d" | "168h" => Ok(TimeWindow::Week),
            other => other
                .parse::<u32>()
                .map_err(|_| TrendsError::InvalidParameter(format!("unknown time window '{s}'")))
                .and_then(TimeWindow::from_hours),
        }
    }
}

/// Options shared by every key of a request.
///
/// Together with the [`FetchKey`](super::FetchKey) these determine both the
/// request URL and the cache fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchOptions {
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub window: TimeWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Reject malformed options before any network call.
    pub fn validate(&self) -> Result<()> {
        if let Some(lang) = &self.language {
            let ok = (2..=8).contains(&lang.len())
                && lang.bytes().all(|b| b.is_ascii_alphabetic() || b == b'-')
                && !lang.starts_with('-')
                && !lang.ends_with('-');
            if !ok {
                return Err(TrendsError::InvalidParameter(format!(
                    "invalid language tag '{lang}'"
                )));
            }
        }
        Ok(())
    }

    /// Query parameters beyond `geo`, omitting defaults.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.window != TimeWindow::Day {
            pairs.push(("hours", self.window.hours().to_string()));
        }
        if let Some(code) = self.category.wire_code() {
            pairs.push(("cat", code.to_string()));
        }
        if let Some(lang) = &self.language {
            pairs.push(("hl", lang.clone()));
        }
        pairs
    }
}
