//! Error types for election trends

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Workspace-wide error type
#[derive(Error, Debug)]
pub enum TrendError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// No votes remain to be counted, so the hurdle has no defined value
    #[error("Hurdle undefined for {race} at {timestamp}: no votes remaining")]
    DivisionUndefined {
        race: String,
        timestamp: DateTime<Utc>,
    },

    /// Snapshots were handed over out of capture order
    #[error("Snapshot at {current} arrived after snapshot at {previous}")]
    OutOfOrder {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("Invalid snapshot for {race} at {timestamp}: {reason}")]
    InvalidSnapshot {
        race: String,
        timestamp: DateTime<Utc>,
        reason: String,
    },

    #[error("Race not found: {0}")]
    RaceNotFound(String),
}

impl TrendError {
    pub fn api(msg: impl Into<String>) -> Self {
        TrendError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        TrendError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        TrendError::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        TrendError::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        TrendError::Config(msg.into())
    }

    pub fn git(msg: impl Into<String>) -> Self {
        TrendError::Git(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        TrendError::Io(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        TrendError::Internal(msg.into())
    }

    pub fn race_not_found(race: impl Into<String>) -> Self {
        TrendError::RaceNotFound(race.into())
    }
}

/// Result type alias for trend operations
pub type TrendResult<T> = Result<T, TrendError>;
