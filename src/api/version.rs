//! Framework versions
//!
//! An [`ApiVersion`] is an ordered tuple of non-negative integers. Shorter
//! tuples are padded with zeros for comparison, so `11` == `11.0` == `11.0.0`
//! and `11.0.1` > `11`.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

static NUMERIC_PREFIX: OnceLock<Option<Regex>> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion(SmallVec<[u32; 4]>);

impl ApiVersion {
    pub fn new(components: &[u32]) -> Self {
        ApiVersion(SmallVec::from_slice(components))
    }

    /// Strict parse of a dotted numeric version (`"11.0.2"`)
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidVersion("empty version".into()));
        }
        text.split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| Error::InvalidVersion(format!("'{}' in '{}'", part, text)))
            })
            .collect::<Result<SmallVec<[u32; 4]>>>()
            .map(ApiVersion)
    }

    /// Lenient parse taking the first dotted number in `text`
    /// (`"22.0.3-SNAPSHOT"` -> `22.0.3`, `"v1.2"` -> `1.2`)
    pub fn extract(text: &str) -> Option<Self> {
        let pattern = NUMERIC_PREFIX
            .get_or_init(|| Regex::new(r"\d+(?:\.\d+)*").ok())
            .as_ref()?;
        let found = pattern.find(text)?;
        Self::parse(found.as_str()).ok()
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    pub fn major(&self) -> u32 {
        self.0.first().copied().unwrap_or(0)
    }

    /// Components without trailing zeros
    fn significant(&self) -> &[u32] {
        let len = self
            .0
            .iter()
            .rposition(|c| *c != 0)
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.0[..len]
    }

    pub fn exactly(&self, other: &ApiVersion) -> bool {
        self == other
    }

    pub fn at_least(&self, other: &ApiVersion) -> bool {
        self >= other
    }

    pub fn at_most(&self, other: &ApiVersion) -> bool {
        self <= other
    }
}

impl PartialEq for ApiVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ApiVersion {}

impl Hash for ApiVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| {
                let a = self.0.get(i).copied().unwrap_or(0);
                let b = other.0.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ApiVersion::parse(s)
    }
}

impl TryFrom<String> for ApiVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        ApiVersion::parse(&value)
    }
}

impl From<ApiVersion> for String {
    fn from(version: ApiVersion) -> String {
        version.to_string()
    }
}

impl From<u32> for ApiVersion {
    fn from(major: u32) -> Self {
        ApiVersion::new(&[major])
    }
}

/// Comparison of a detected version against a reference version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiRequirement {
    Exactly(ApiVersion),
    AtLeast(ApiVersion),
    AtMost(ApiVersion),
}

impl ApiRequirement {
    pub fn matches(&self, version: &ApiVersion) -> bool {
        match self {
            ApiRequirement::Exactly(v) => version.exactly(v),
            ApiRequirement::AtLeast(v) => version.at_least(v),
            ApiRequirement::AtMost(v) => version.at_most(v),
        }
    }
}

impl fmt::Display for ApiRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiRequirement::Exactly(v) => write!(f, "=={}", v),
            ApiRequirement::AtLeast(v) => write!(f, ">={}", v),
            ApiRequirement::AtMost(v) => write!(f, "<={}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn v(text: &str) -> ApiVersion {
        ApiVersion::parse(text).unwrap()
    }

    #[test]
    fn test_trailing_zeros_are_insignificant() {
        assert_eq!(v("11"), v("11.0.0"));
        assert!(v("11.0.1") > v("11"));
        assert!(v("10.9") < v("11"));
        let set: HashSet<ApiVersion> = [v("11"), v("11.0"), v("11.0.0")].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(ApiVersion::parse("").is_err());
        assert!(ApiVersion::parse("1..2").is_err());
        assert!(ApiVersion::parse("1.x").is_err());
        assert!(ApiVersion::parse("-1").is_err());
    }

    #[test]
    fn test_extract() {
        assert_eq!(ApiVersion::extract("22.0.3-SNAPSHOT"), Some(v("22.0.3")));
        assert_eq!(ApiVersion::extract("release v10.1"), Some(v("10.1")));
        assert_eq!(ApiVersion::extract("no digits"), None);
    }

    #[test]
    fn test_requirements() {
        let detected = v("11.0.2");
        assert!(ApiRequirement::AtLeast(v("11")).matches(&detected));
        assert!(!ApiRequirement::AtMost(v("11")).matches(&detected));
        assert!(ApiRequirement::Exactly(v("11.0.2.0")).matches(&detected));
        assert_eq!(ApiRequirement::AtLeast(v("8")).to_string(), ">=8");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&v("13.1")).unwrap();
        assert_eq!(json, "\"13.1\"");
        let back: ApiVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("13.1"));
        assert!(serde_json::from_str::<ApiVersion>("\"x\"").is_err());
    }
}
