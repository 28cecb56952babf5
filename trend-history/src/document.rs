//! Results document types
//!
//! These types mirror the results file committed on every scrape and are
//! converted to trend-core snapshots one race at a time.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use trend_core::{RaceKey, Snapshot, TrendError, TrendResult};

/// Capture timestamp format used in `meta.timestamp`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// One committed revision of the results file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResultsDocument {
    pub meta: DocumentMeta,
    pub data: DocumentData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentMeta {
    /// When the results were captured, e.g. "2020-11-05T14:03:12.845Z"
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentData {
    #[serde(default)]
    pub races: Vec<RaceResult>,
}

/// A single race inside a results document
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RaceResult {
    /// State the race is in
    pub state_name: String,

    #[serde(default)]
    pub race_id: Option<String>,

    #[serde(default)]
    pub electoral_votes: Option<u32>,

    /// Candidates in source order (first is treated as leading)
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Total votes cast in the race
    pub votes: u64,

    /// Expected total vote
    pub tot_exp_vote: u64,

    pub precincts_reporting: u64,
    pub precincts_total: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Candidate {
    #[serde(default)]
    pub candidate_key: Option<String>,

    pub last_name: String,

    #[serde(default)]
    pub first_name: Option<String>,

    pub votes: u64,
}

impl ResultsDocument {
    /// Parse a results document from raw bytes
    pub fn from_slice(bytes: &[u8]) -> TrendResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| TrendError::parse(format!("Failed to parse results document: {}", e)))
    }

    /// Capture time embedded in the document
    pub fn timestamp(&self) -> TrendResult<DateTime<Utc>> {
        let raw = self.meta.timestamp.trim();
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
            .map_err(|e| TrendError::parse(format!("Invalid capture timestamp '{}': {}", raw, e)))
    }

    /// Look up a race by position or name
    pub fn race(&self, key: &RaceKey) -> TrendResult<&RaceResult> {
        self.data
            .races
            .iter()
            .enumerate()
            .find(|(index, race)| key.matches(*index, &race.state_name))
            .map(|(_, race)| race)
            .ok_or_else(|| TrendError::race_not_found(key.to_string()))
    }

    /// Every race in the document, keyed by name
    pub fn race_keys(&self) -> Vec<RaceKey> {
        self.data
            .races
            .iter()
            .map(|race| RaceKey::Name(race.state_name.clone()))
            .collect()
    }

    /// Build the snapshot of one race at this document's capture time
    pub fn snapshot(&self, key: &RaceKey) -> TrendResult<Snapshot> {
        let timestamp = self.timestamp()?;
        self.race(key)?.to_snapshot(timestamp)
    }
}

impl RaceResult {
    /// Convert to a trend-core snapshot
    pub fn to_snapshot(&self, timestamp: DateTime<Utc>) -> TrendResult<Snapshot> {
        let (leading, trailing) = match self.candidates.as_slice() {
            [first, second, ..] => (first, second),
            _ => {
                return Err(TrendError::parse(format!(
                    "Race '{}' lists {} candidates, need at least two",
                    self.state_name,
                    self.candidates.len()
                )))
            }
        };

        Ok(Snapshot {
            timestamp,
            race_name: self.state_name.clone(),
            leading_name: leading.last_name.clone(),
            leading_votes: leading.votes,
            trailing_name: trailing.last_name.clone(),
            trailing_votes: trailing.votes,
            votes_cast: self.votes,
            total_expected_votes: self.tot_exp_vote,
            precincts_reporting: self.precincts_reporting,
            precincts_total: self.precincts_total,
        })
    }
}
