//! Services for Election Trends
//!
//! Runs the trend aggregator over every tracked race in a loaded history and
//! renders the resulting report as text, HTML or JSON.

pub mod render;
pub mod tracker;

pub use render::{render_html, render_json, render_text, ReportFormat};
pub use tracker::{RaceOutcome, RaceTracker, RaceTrend, TrendReport};
