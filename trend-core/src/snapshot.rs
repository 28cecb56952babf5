//! Vote snapshots for a single race at a single capture time

use crate::error::{TrendError, TrendResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One race's vote counts as captured at one point in time
///
/// Candidates are positional: whoever the source lists first is treated as
/// leading, whoever it lists second as trailing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Capture time of the document this snapshot came from
    pub timestamp: DateTime<Utc>,

    /// Display name of the race (usually the state)
    pub race_name: String,

    pub leading_name: String,
    pub leading_votes: u64,

    pub trailing_name: String,
    pub trailing_votes: u64,

    /// All votes cast in the race, minor candidates included
    pub votes_cast: u64,

    /// Estimate of the final vote total
    pub total_expected_votes: u64,

    pub precincts_reporting: u64,
    pub precincts_total: u64,
}

impl Snapshot {
    /// Signed lead of the first-listed candidate over the second
    pub fn vote_differential(&self) -> i64 {
        self.leading_votes as i64 - self.trailing_votes as i64
    }

    /// Estimated votes still to be counted
    pub fn votes_remaining(&self) -> i64 {
        self.total_expected_votes as i64 - self.votes_cast as i64
    }

    /// Check the per-snapshot input contract
    pub fn validate(&self) -> TrendResult<()> {
        let reason = if self.precincts_reporting > self.precincts_total {
            Some(format!(
                "{} precincts reporting out of {}",
                self.precincts_reporting, self.precincts_total
            ))
        } else if self.votes_cast < self.leading_votes + self.trailing_votes {
            Some(format!(
                "{} votes cast but the top two candidates hold {}",
                self.votes_cast,
                self.leading_votes + self.trailing_votes
            ))
        } else if self.total_expected_votes < self.votes_cast {
            Some(format!(
                "{} votes expected but {} already cast",
                self.total_expected_votes, self.votes_cast
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(TrendError::InvalidSnapshot {
                race: self.race_name.clone(),
                timestamp: self.timestamp,
                reason,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot() -> Snapshot {
        Snapshot {
            timestamp: Utc.with_ymd_and_hms(2020, 11, 5, 12, 0, 0).unwrap(),
            race_name: "Georgia".to_string(),
            leading_name: "trump".to_string(),
            leading_votes: 1000,
            trailing_name: "biden".to_string(),
            trailing_votes: 900,
            votes_cast: 1950,
            total_expected_votes: 2200,
            precincts_reporting: 10,
            precincts_total: 12,
        }
    }

    #[test]
    fn test_derived_counts() {
        let s = snapshot();
        assert_eq!(s.vote_differential(), 100);
        assert_eq!(s.votes_remaining(), 250);

        let flipped = Snapshot {
            leading_votes: 800,
            ..snapshot()
        };
        assert_eq!(flipped.vote_differential(), -100);
    }

    #[test]
    fn test_validate_accepts_contract() {
        assert!(snapshot().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_precinct_overflow() {
        let s = Snapshot {
            precincts_reporting: 13,
            ..snapshot()
        };
        assert!(matches!(
            s.validate(),
            Err(TrendError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_votes_above_expected() {
        let s = Snapshot {
            total_expected_votes: 1900,
            ..snapshot()
        };
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("1900 votes expected"));
    }

    #[test]
    fn test_validate_rejects_short_vote_total() {
        let s = Snapshot {
            votes_cast: 1800,
            ..snapshot()
        };
        assert!(s.validate().is_err());
    }
}
