//! Snapshot history for Election Trends
//!
//! Pulls every committed revision of a results file out of version control,
//! parses each one, and hands back captures sorted by the timestamp embedded
//! in the document. Two sources are provided: a local git clone and the
//! GitHub REST API.

pub mod document;
pub mod git;
pub mod github;
pub mod source;

pub use document::{Candidate, RaceResult, ResultsDocument};
pub use git::GitHistory;
pub use github::GithubHistory;
pub use source::{load_history, Capture, History, HistorySource, LoadOptions};
