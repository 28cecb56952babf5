//! Core types for Election Trends
//!
//! This crate holds the vote snapshot model and the trend aggregator that
//! turns one race's ordered snapshots into summaries of how the trailing
//! candidate's path to a tie is changing. Everything here is pure and
//! synchronous; fetching history and rendering live in other crates.

pub mod aggregator;
pub mod error;
pub mod moving_average;
pub mod race;
pub mod snapshot;
pub mod summary;

pub use aggregator::{aggregate, TrendFold};
pub use error::{TrendError, TrendResult};
pub use moving_average::{moving_average, MOVING_AVERAGE_WINDOW};
pub use race::RaceKey;
pub use snapshot::Snapshot;
pub use summary::{hurdle, CarriedState, Partition, Summary};
