//! Region key identifying one feed endpoint

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, TrendsError};

/// Region code identifying one feed (e.g. `US`, `GB`, `US-CA`).
///
/// Normalised to upper case on construction. A key is two ASCII letters,
/// optionally followed by `-` and a one to three character sub-region code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FetchKey(String);

impl FetchKey {
    /// Validate and normalise a region code.
    pub fn new(code: impl AsRef<str>) -> Result<Self> {
        let code = code.as_ref().trim().to_ascii_uppercase();
        let (country, region) = match code.split_once('-') {
            Some((country, region)) => (country, Some(region)),
            None => (code.as_str(), None),
        };

        let country_ok = country.len() == 2 && country.bytes().all(|b| b.is_ascii_alphabetic());
        let region_ok = region.is_none_or(|r| {
            (1..=3).contains(&r.len()) && r.bytes().all(|b| b.is_ascii_alphanumeric())
        });

        if !country_ok || !region_ok {
            return Err(TrendsError::InvalidParameter(format!(
                "invalid region code '{code}' (expected e.g. 'US' or 'US-CA')"
            )));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-letter country part of the key.
    pub fn country(&self) -> &str {
        &self.0[..2]
    }

    /// Parse several codes at once, failing on the first invalid one.
    pub fn parse_all<I, S>(codes: I) -> Result<Vec<FetchKey>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes.into_iter().map(FetchKey::new).collect()
    }
}

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FetchKey {
    type Err = TrendsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for FetchKey {
    type Error = TrendsError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<FetchKey> for String {
    fn from(key: FetchKey) -> Self {
        key.0
    }
}

impl AsRef<str> for FetchKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
