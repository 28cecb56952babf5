//! Race tracker
//!
//! Aggregates each tracked race on its own. A race that fails (missing from a
//! capture, malformed counts, nothing left to count) is reported as failed
//! and never stops the others.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use trend_core::{RaceKey, Summary, TrendError, TrendFold, TrendResult};
use trend_history::History;

/// Result of tracking one race
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RaceOutcome {
    Tracked {
        /// Most recent first
        summaries: Vec<Summary>,
        /// Snapshots dropped because nothing observable changed
        duplicates: usize,
    },
    Failed {
        error: String,
    },
}

/// One race in a report
#[derive(Debug, Clone, Serialize)]
pub struct RaceTrend {
    pub key: RaceKey,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electoral_votes: Option<u32>,
    #[serde(flatten)]
    pub outcome: RaceOutcome,
}

impl RaceTrend {
    /// Newest summary, if the race was tracked and has any
    pub fn latest(&self) -> Option<&Summary> {
        match &self.outcome {
            RaceOutcome::Tracked { summaries, .. } => summaries.first(),
            RaceOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, RaceOutcome::Failed { .. })
    }
}

/// Trends for every tracked race
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_capture: Option<DateTime<Utc>>,
    pub captures: usize,
    pub races: Vec<RaceTrend>,
}

/// Runs the aggregator over races in a loaded history
pub struct RaceTracker<'a> {
    history: &'a History,
}

impl<'a> RaceTracker<'a> {
    pub fn new(history: &'a History) -> Self {
        Self { history }
    }

    /// Track the given races, or every race in the latest capture when `races` is empty
    pub fn track(&self, races: &[RaceKey]) -> TrendReport {
        let keys: Vec<RaceKey> = if races.is_empty() {
            self.history
                .latest()
                .map(|capture| capture.document.race_keys())
                .unwrap_or_default()
        } else {
            races.to_vec()
        };

        info!("Tracking {} races over {} captures", keys.len(), self.history.len());

        let races = keys.iter().map(|key| self.track_race(key)).collect();

        TrendReport {
            generated_at: Utc::now(),
            latest_capture: self.history.latest().map(|capture| capture.timestamp),
            captures: self.history.len(),
            races,
        }
    }

    fn track_race(&self, key: &RaceKey) -> RaceTrend {
        let race = self
            .history
            .latest()
            .and_then(|capture| capture.document.race(key).ok());
        let name = race
            .map(|r| r.state_name.clone())
            .unwrap_or_else(|| key.to_string());
        let electoral_votes = race.and_then(|r| r.electoral_votes);

        let outcome = match self.aggregate_race(key) {
            Ok((summaries, duplicates)) => {
                debug!(
                    "{}: {} summaries, {} duplicates dropped",
                    name,
                    summaries.len(),
                    duplicates
                );
                RaceOutcome::Tracked {
                    summaries,
                    duplicates,
                }
            }
            Err(e) => {
                warn!("Failed to track {}: {}", name, e);
                RaceOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        RaceTrend {
            key: key.clone(),
            name,
            electoral_votes,
            outcome,
        }
    }

    fn aggregate_race(&self, key: &RaceKey) -> TrendResult<(Vec<Summary>, usize)> {
        let snapshots = self.history.snapshots(key)?;
        if snapshots.is_empty() {
            return Err(TrendError::not_found(format!("No snapshots for {}", key)));
        }

        let fold = snapshots
            .iter()
            .try_fold(TrendFold::new(), |fold, snapshot| fold.step(snapshot))?;
        let duplicates = fold.duplicates();
        Ok((fold.finish(), duplicates))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use trend_history::{Capture, ResultsDocument};

    fn document(minutes: i64, races: &[(&str, u64, u64, u64)]) -> ResultsDocument {
        let timestamp = Utc.with_ymd_and_hms(2020, 11, 6, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        let races: Vec<serde_json::Value> = races
            .iter()
            .map(|&(state, leading, trailing, expected)| {
                serde_json::json!({
                    "state_name": state,
                    "electoral_votes": 16,
                    "candidates": [
                        { "last_name": "Trump", "votes": leading },
                        { "last_name": "Biden", "votes": trailing }
                    ],
                    "votes": leading + trailing,
                    "tot_exp_vote": expected,
                    "precincts_reporting": 100,
                    "precincts_total": 120
                })
            })
            .collect();
        let json = serde_json::json!({
            "meta": { "timestamp": timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string() },
            "data": { "races": races }
        });
        serde_json::from_value(json).unwrap()
    }

    pub(crate) fn history(docs: Vec<ResultsDocument>) -> History {
        let captures = docs
            .into_iter()
            .enumerate()
            .map(|(i, document)| Capture {
                revision: format!("rev{}", i),
                timestamp: document.timestamp().unwrap(),
                document,
            })
            .collect();
        History::from_captures(captures)
    }

    pub(crate) fn sample_history() -> History {
        history(vec![
            document(0, &[("Georgia", 2_440_000, 2_420_000, 5_000_000), ("Nevada", 600_000, 610_000, 1_300_000)]),
            document(30, &[("Georgia", 2_445_000, 2_430_000, 5_000_000), ("Nevada", 600_000, 610_000, 1_300_000)]),
            // Nevada fully counted: no hurdle can be computed
            document(60, &[("Georgia", 2_449_000, 2_441_000, 5_000_000), ("Nevada", 650_000, 650_000, 1_300_000)]),
        ])
    }

    #[test]
    fn test_track_all_races() {
        let history = sample_history();
        let report = RaceTracker::new(&history).track(&[]);

        assert_eq!(report.captures, 3);
        assert_eq!(report.races.len(), 2);

        let georgia = &report.races[0];
        assert_eq!(georgia.name, "Georgia");
        assert_eq!(georgia.electoral_votes, Some(16));
        match &georgia.outcome {
            RaceOutcome::Tracked { summaries, duplicates } => {
                assert_eq!(summaries.len(), 3);
                assert_eq!(*duplicates, 0);
                assert_eq!(summaries[0].vote_differential, 8_000);
            }
            RaceOutcome::Failed { error } => panic!("Georgia failed: {}", error),
        }
    }

    #[test]
    fn test_failed_race_does_not_stop_others() {
        let history = sample_history();
        let report = RaceTracker::new(&history).track(&[RaceKey::from("Nevada"), RaceKey::from("Georgia")]);

        assert!(report.races[0].is_failed());
        assert!(report.races[0].latest().is_none());
        match &report.races[0].outcome {
            RaceOutcome::Failed { error } => assert!(error.contains("no votes remaining")),
            _ => panic!("Nevada should fail"),
        }
        assert!(!report.races[1].is_failed());
        assert!(report.races[1].latest().is_some());
    }

    #[test]
    fn test_unknown_race_reported() {
        let history = sample_history();
        let report = RaceTracker::new(&history).track(&[RaceKey::Index(9)]);
        assert_eq!(report.races[0].name, "9");
        assert!(report.races[0].is_failed());
    }

    #[test]
    fn test_empty_history() {
        let history = History::default();
        let report = RaceTracker::new(&history).track(&[RaceKey::from("Georgia")]);
        assert_eq!(report.latest_capture, None);
        assert!(report.races[0].is_failed());
    }

    #[test]
    fn test_duplicates_counted() {
        let repeat = history_with_repeat();
        let report = RaceTracker::new(&repeat).track(&[RaceKey::Index(0)]);
        match &report.races[0].outcome {
            RaceOutcome::Tracked { summaries, duplicates } => {
                assert_eq!(summaries.len(), 1);
                assert_eq!(*duplicates, 1);
            }
            RaceOutcome::Failed { error } => panic!("{}", error),
        }
    }

    fn history_with_repeat() -> History {
        history(vec![
            document(0, &[("Arizona", 1_500_000, 1_480_000, 3_400_000)]),
            document(5, &[("Arizona", 1_500_000, 1_480_000, 3_400_000)]),
        ])
    }

    #[test]
    fn test_report_json_shape() {
        let history = sample_history();
        let report = RaceTracker::new(&history).track(&[]);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["races"][0]["status"], "tracked");
        assert_eq!(value["races"][0]["key"], "Georgia");
        assert!(value["races"][0]["summaries"].is_array());
        assert_eq!(value["races"][1]["status"], "failed");
        assert!(value["races"][1]["error"].is_string());
    }
}
