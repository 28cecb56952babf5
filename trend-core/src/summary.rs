//! Per-snapshot summaries and the state carried between them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What we knew at the end of the previously accepted summary
///
/// Two snapshots that produce equal carried states are the same observation;
/// the later one is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarriedState {
    pub vote_diff: i64,
    pub votes_cast: u64,
    pub precincts_reporting: u64,
    pub hurdle: f64,
}

/// How an increment of newly counted votes split between the two candidates
///
/// Shares sum to 1. A share outside [0, 1] means the source revised counts
/// downward and is kept as reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub leading: f64,
    pub trailing: f64,
}

impl Partition {
    /// Split `new_votes` using the change in vote differential across the increment
    ///
    /// Returns `None` when there is no increment to split.
    pub fn from_increment(new_votes: i64, previous_diff: i64, current_diff: i64) -> Option<Self> {
        if new_votes == 0 {
            return None;
        }
        let trailing =
            ((new_votes + (previous_diff - current_diff)) as f64 / 2.0) / new_votes as f64;
        Some(Self {
            leading: 1.0 - trailing,
            trailing,
        })
    }
}

/// Share of all remaining votes the trailing candidate must win to tie
///
/// Returns `None` when no votes remain, since the share is then undefined.
pub fn hurdle(votes_remaining: i64, vote_diff: i64) -> Option<f64> {
    if votes_remaining == 0 {
        return None;
    }
    Some(((votes_remaining + vote_diff) as f64 / 2.0) / votes_remaining as f64)
}

/// Derived statistics for one accepted snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub timestamp: DateTime<Utc>,
    pub race_name: String,
    pub leading_candidate_name: String,
    pub trailing_candidate_name: String,

    /// Leading minus trailing votes
    pub vote_differential: i64,

    /// Expected total minus votes cast
    pub votes_remaining: i64,

    /// Votes cast since the previous accepted summary (0 for the first one)
    pub new_votes: i64,

    /// Split of `new_votes`, absent when there were none
    pub partition: Option<Partition>,

    pub precincts_reporting: u64,
    pub precincts_total: u64,

    pub hurdle: f64,

    /// Hurdle minus the previous accepted summary's hurdle
    pub hurdle_change: f64,

    /// Trailing candidate's votes-weighted share over the recent window
    pub hurdle_moving_average: Option<f64>,
}

impl Summary {
    /// Leading share of the increment, 0 when there was no increment
    pub fn leading_candidate_partition(&self) -> f64 {
        self.partition.map(|p| p.leading).unwrap_or(0.0)
    }

    /// Trailing share of the increment, 0 when there was no increment
    pub fn trailing_candidate_partition(&self) -> f64 {
        self.partition.map(|p| p.trailing).unwrap_or(0.0)
    }
}
