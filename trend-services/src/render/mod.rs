//! Report rendering
//!
//! Turns a [`TrendReport`] into text, HTML or JSON. All percentage and count
//! formatting happens here; the summaries themselves stay raw.

mod html;
mod text;

pub use html::render_html;
pub use text::render_text;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use trend_core::{TrendError, TrendResult};

use crate::tracker::TrendReport;

/// Base name of the written report files
const REPORT_FILE_STEM: &str = "battleground-state-changes";

/// Output formats for a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Html,
    Json,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Text, ReportFormat::Html, ReportFormat::Json];

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }

    /// File name the report is written under
    pub fn file_name(&self) -> String {
        format!("{}.{}", REPORT_FILE_STEM, self.extension())
    }

    /// Render a report in this format
    pub fn render(&self, report: &TrendReport) -> TrendResult<String> {
        match self {
            ReportFormat::Text => Ok(render_text(report)),
            ReportFormat::Html => Ok(render_html(report)),
            ReportFormat::Json => render_json(report),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportFormat::Text => "text",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "html" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

/// Pretty-printed JSON of the whole report
pub fn render_json(report: &TrendReport) -> TrendResult<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| TrendError::internal(format!("Failed to serialize report: {}", e)))
}

// ============================================================================
// Shared formatting
// ============================================================================

/// Fraction as a percentage with one decimal place
pub(crate) fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub(crate) fn optional_percent(value: Option<f64>) -> String {
    value.map(percent).unwrap_or_else(|| "n/a".to_string())
}

/// Signed percentage-point change
pub(crate) fn percent_change(value: f64) -> String {
    format!("{:+.1}%", value * 100.0)
}

/// Count with thousands separators
pub(crate) fn count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk))
        .join(",");
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Count with an explicit sign
pub(crate) fn signed_count(value: i64) -> String {
    if value > 0 {
        format!("+{}", count(value))
    } else {
        count(value)
    }
}
