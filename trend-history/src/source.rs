//! History sources and the concurrent loader

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};
use trend_core::{RaceKey, Snapshot, TrendResult};

use crate::document::ResultsDocument;

/// Default number of revisions fetched at once
const DEFAULT_CONCURRENCY: usize = 8;

/// Somewhere the committed revisions of a results file can be read from
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Short description for logs
    fn name(&self) -> &str;

    /// Revision ids that touched the results file, newest first
    async fn revisions(&self) -> TrendResult<Vec<String>>;

    /// Raw results file as of one revision
    async fn fetch(&self, revision: &str) -> TrendResult<Vec<u8>>;
}

/// Options for [`load_history`]
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Revisions fetched at once
    pub concurrency: usize,
    /// Only look at this many of the newest revisions
    pub max_revisions: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_revisions: None,
        }
    }
}

/// A parsed revision of the results file
#[derive(Debug, Clone)]
pub struct Capture {
    pub revision: String,
    pub timestamp: DateTime<Utc>,
    pub document: ResultsDocument,
}

impl Capture {
    fn parse(revision: String, bytes: &[u8]) -> TrendResult<Self> {
        let document = ResultsDocument::from_slice(bytes)?;
        let timestamp = document.timestamp()?;
        Ok(Self {
            revision,
            timestamp,
            document,
        })
    }
}

/// Captures in ascending timestamp order, one per capture time
#[derive(Debug, Clone, Default)]
pub struct History {
    captures: Vec<Capture>,
    skipped: usize,
}

impl History {
    /// Build a history from captures in any order
    pub fn from_captures(mut captures: Vec<Capture>) -> Self {
        captures.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        let before = captures.len();
        captures.dedup_by(|later, earlier| later.timestamp == earlier.timestamp);
        let duplicates = before - captures.len();
        if duplicates > 0 {
            debug!("Dropped {} captures sharing a timestamp", duplicates);
        }
        Self {
            captures,
            skipped: 0,
        }
    }

    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    /// Most recent capture
    pub fn latest(&self) -> Option<&Capture> {
        self.captures.last()
    }

    /// Revisions that could not be fetched or parsed
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// One race's snapshots, oldest first
    ///
    /// Fails if any capture lacks the race or cannot be converted.
    pub fn snapshots(&self, key: &RaceKey) -> TrendResult<Vec<Snapshot>> {
        self.captures
            .iter()
            .map(|capture| {
                capture
                    .document
                    .race(key)
                    .and_then(|race| race.to_snapshot(capture.timestamp))
            })
            .collect()
    }
}

/// Fetch every revision from `source`, parse it, and sort by capture time
///
/// Revisions that fail to fetch or parse are logged and skipped.
#[instrument(skip(source), fields(source_name = source.name()))]
pub async fn load_history(
    source: &dyn HistorySource,
    options: &LoadOptions,
) -> TrendResult<History> {
    let mut revisions = source.revisions().await?;
    if let Some(max) = options.max_revisions {
        revisions.truncate(max);
    }
    let requested = revisions.len();
    info!("Fetching {} revisions from {}", requested, source.name());

    let captures: Vec<Capture> = stream::iter(revisions)
        .map(|revision| async move {
            let result = match source.fetch(&revision).await {
                Ok(bytes) => Capture::parse(revision.clone(), &bytes),
                Err(e) => Err(e),
            };
            match result {
                Ok(capture) => Some(capture),
                Err(e) => {
                    warn!("Skipping revision {}: {}", revision, e);
                    None
                }
            }
        })
        .buffer_unordered(options.concurrency.max(1))
        .filter_map(|capture| async { capture })
        .collect()
        .await;

    let skipped = requested - captures.len();
    let mut history = History::from_captures(captures);
    history.skipped = skipped;

    info!(
        "Loaded {} captures ({} revisions skipped)",
        history.len(),
        skipped
    );
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use trend_core::TrendError;

    /// Revisions held in memory, newest first
    struct MemorySource {
        revisions: Vec<String>,
        blobs: HashMap<String, Vec<u8>>,
    }

    impl MemorySource {
        fn new(entries: Vec<(&str, String)>) -> Self {
            Self {
                revisions: entries.iter().map(|(rev, _)| rev.to_string()).collect(),
                blobs: entries
                    .into_iter()
                    .map(|(rev, body)| (rev.to_string(), body.into_bytes()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl HistorySource for MemorySource {
        fn name(&self) -> &str {
            "memory"
        }

        async fn revisions(&self) -> TrendResult<Vec<String>> {
            Ok(self.revisions.clone())
        }

        async fn fetch(&self, revision: &str) -> TrendResult<Vec<u8>> {
            self.blobs
                .get(revision)
                .cloned()
                .ok_or_else(|| TrendError::not_found(revision.to_string()))
        }
    }

    fn doc(timestamp: &str, leading: u64, trailing: u64) -> String {
        format!(
            r#"{{
                "meta": {{ "timestamp": "{timestamp}" }},
                "data": {{ "races": [{{
                    "state_name": "Nevada",
                    "candidates": [
                        {{ "last_name": "Biden", "votes": {leading} }},
                        {{ "last_name": "Trump", "votes": {trailing} }}
                    ],
                    "votes": {total},
                    "tot_exp_vote": 1400000,
                    "precincts_reporting": 1800,
                    "precincts_total": 2000
                }}] }}
            }}"#,
            total = leading + trailing
        )
    }

    #[tokio::test]
    async fn test_load_sorts_by_embedded_timestamp() {
        // Commit order disagrees with capture order
        let source = MemorySource::new(vec![
            ("c3", doc("2020-11-05T10:00:00.000Z", 600_000, 590_000)),
            ("c1", doc("2020-11-05T12:00:00.000Z", 620_000, 600_000)),
            ("c2", doc("2020-11-05T08:00:00.000Z", 580_000, 575_000)),
        ]);

        let history = load_history(&source, &LoadOptions::default()).await.unwrap();
        let revisions: Vec<&str> = history
            .captures()
            .iter()
            .map(|c| c.revision.as_str())
            .collect();
        assert_eq!(revisions, vec!["c2", "c3", "c1"]);
        assert_eq!(history.latest().unwrap().revision, "c1");

        let snapshots = history.snapshots(&RaceKey::from("Nevada")).unwrap();
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[0].leading_votes, 580_000);
        assert!(snapshots.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_bad_revisions_are_skipped() {
        let mut source = MemorySource::new(vec![
            ("good", doc("2020-11-05T10:00:00.000Z", 600_000, 590_000)),
            ("broken", "{ not json".to_string()),
        ]);
        source.revisions.push("missing".to_string());

        let history = load_history(&source, &LoadOptions::default()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.skipped(), 2);
    }

    #[tokio::test]
    async fn test_same_capture_committed_twice() {
        let source = MemorySource::new(vec![
            ("b", doc("2020-11-05T10:00:00.000Z", 600_000, 590_000)),
            ("a", doc("2020-11-05T10:00:00.000Z", 600_000, 590_000)),
        ]);
        let history = load_history(&source, &LoadOptions::default()).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_max_revisions_keeps_newest() {
        let source = MemorySource::new(vec![
            ("c3", doc("2020-11-05T12:00:00.000Z", 620_000, 600_000)),
            ("c2", doc("2020-11-05T10:00:00.000Z", 600_000, 590_000)),
            ("c1", doc("2020-11-05T08:00:00.000Z", 580_000, 575_000)),
        ]);
        let options = LoadOptions {
            concurrency: 1,
            max_revisions: Some(2),
        };
        let history = load_history(&source, &options).await.unwrap();
        let revisions: Vec<&str> = history
            .captures()
            .iter()
            .map(|c| c.revision.as_str())
            .collect();
        assert_eq!(revisions, vec!["c2", "c3"]);
    }

    #[tokio::test]
    async fn test_unknown_race_fails() {
        let source = MemorySource::new(vec![(
            "c1",
            doc("2020-11-05T08:00:00.000Z", 580_000, 575_000),
        )]);
        let history = load_history(&source, &LoadOptions::default()).await.unwrap();
        assert!(matches!(
            history.snapshots(&RaceKey::Index(3)),
            Err(TrendError::RaceNotFound(_))
        ));
    }
}
