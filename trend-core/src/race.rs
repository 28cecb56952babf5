//! Race identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one race inside a results document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RaceKey {
    /// Position in the document's race list
    Index(usize),
    /// Race (state) name, matched case-insensitively
    Name(String),
}

impl RaceKey {
    /// Check whether a race with this position and name is the one we want
    pub fn matches(&self, index: usize, name: &str) -> bool {
        match self {
            RaceKey::Index(i) => *i == index,
            RaceKey::Name(n) => n.eq_ignore_ascii_case(name.trim()),
        }
    }
}

impl fmt::Display for RaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceKey::Index(i) => write!(f, "{}", i),
            RaceKey::Name(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for RaceKey {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(i) = s.parse() {
                return RaceKey::Index(i);
            }
        }
        RaceKey::Name(s.to_string())
    }
}

impl From<String> for RaceKey {
    fn from(s: String) -> Self {
        RaceKey::from(s.as_str())
    }
}

impl From<RaceKey> for String {
    fn from(key: RaceKey) -> Self {
        key.to_string()
    }
}

impl std::str::FromStr for RaceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("Race key cannot be empty".to_string());
        }
        Ok(RaceKey::from(s))
    }
}
