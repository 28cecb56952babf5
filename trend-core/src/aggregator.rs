//! Trend aggregator
//!
//! Walks one race's snapshots oldest to newest, threading a single carried
//! state through the walk, and emits one summary per snapshot that changes
//! what we know about the race.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::error::{TrendError, TrendResult};
use crate::moving_average::{moving_average, MOVING_AVERAGE_WINDOW};
use crate::snapshot::Snapshot;
use crate::summary::{hurdle, CarriedState, Partition, Summary};

/// Accumulator for the aggregation fold over one race
#[derive(Debug, Clone, Default)]
pub struct TrendFold {
    carried: Option<CarriedState>,
    /// Accepted summaries, oldest first
    accepted: Vec<Summary>,
    last_timestamp: Option<DateTime<Utc>>,
    duplicates: usize,
}

impl TrendFold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carried state left by the last accepted summary
    pub fn carried(&self) -> Option<&CarriedState> {
        self.carried.as_ref()
    }

    /// Number of snapshots dropped as duplicates so far
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Fold one snapshot into the accumulator
    pub fn step(mut self, snapshot: &Snapshot) -> TrendResult<Self> {
        if let Some(previous) = self.last_timestamp {
            if snapshot.timestamp < previous {
                return Err(TrendError::OutOfOrder {
                    previous,
                    current: snapshot.timestamp,
                });
            }
        }
        snapshot.validate()?;
        self.last_timestamp = Some(snapshot.timestamp);

        let vote_diff = snapshot.vote_differential();
        let votes_remaining = snapshot.votes_remaining();
        let new_votes = match &self.carried {
            Some(carried) => snapshot.votes_cast as i64 - carried.votes_cast as i64,
            None => 0,
        };

        let hurdle = hurdle(votes_remaining, vote_diff).ok_or_else(|| {
            TrendError::DivisionUndefined {
                race: snapshot.race_name.clone(),
                timestamp: snapshot.timestamp,
            }
        })?;

        let previous_diff = self.carried.map(|c| c.vote_diff).unwrap_or(0);
        let partition = Partition::from_increment(new_votes, previous_diff, vote_diff);

        let next_carried = CarriedState {
            vote_diff,
            votes_cast: snapshot.votes_cast,
            precincts_reporting: snapshot.precincts_reporting,
            hurdle,
        };

        if self.carried == Some(next_carried) {
            trace!(
                race = %snapshot.race_name,
                timestamp = %snapshot.timestamp,
                "Skipping duplicate snapshot"
            );
            self.duplicates += 1;
            return Ok(self);
        }

        let previous_hurdle = self.carried.map(|c| c.hurdle).unwrap_or(0.0);
        let hurdle_moving_average =
            moving_average(self.accepted.iter().rev(), MOVING_AVERAGE_WINDOW);

        self.accepted.push(Summary {
            timestamp: snapshot.timestamp,
            race_name: snapshot.race_name.clone(),
            leading_candidate_name: snapshot.leading_name.clone(),
            trailing_candidate_name: snapshot.trailing_name.clone(),
            vote_differential: vote_diff,
            votes_remaining,
            new_votes,
            partition,
            precincts_reporting: snapshot.precincts_reporting,
            precincts_total: snapshot.precincts_total,
            hurdle,
            hurdle_change: hurdle - previous_hurdle,
            hurdle_moving_average,
        });
        self.carried = Some(next_carried);
        Ok(self)
    }

    /// Accepted summaries, most recent first
    pub fn finish(self) -> Vec<Summary> {
        let mut summaries = self.accepted;
        summaries.reverse();
        summaries
    }
}

/// Aggregate one race's snapshots into summaries, most recent first
///
/// Snapshots must be in non-decreasing timestamp order.
pub fn aggregate(race_snapshots: &[Snapshot]) -> TrendResult<Vec<Summary>> {
    let fold = race_snapshots
        .iter()
        .try_fold(TrendFold::new(), |fold, snapshot| fold.step(snapshot))?;
    Ok(fold.finish())
}
