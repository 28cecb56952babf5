//! Plain-text tables

use prettytable::{format, row, Table};
use std::fmt::Write;
use trend_core::Summary;

use super::{count, optional_percent, percent, percent_change, signed_count};
use crate::tracker::{RaceOutcome, RaceTrend, TrendReport};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Render the report as plain text
pub fn render_text(report: &TrendReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Election trends");
    let _ = writeln!(
        out,
        "Generated: {}",
        report.generated_at.format(TIMESTAMP_FORMAT)
    );
    if let Some(latest) = report.latest_capture {
        let _ = writeln!(
            out,
            "Latest capture: {} ({} captures)",
            latest.format(TIMESTAMP_FORMAT),
            report.captures
        );
    }
    out.push('\n');

    let _ = writeln!(out, "Overview");
    out.push_str(&overview_table(&report.races).to_string());
    out.push('\n');

    for race in &report.races {
        out.push_str(&race_heading(race));
        out.push('\n');
        match &race.outcome {
            RaceOutcome::Tracked { summaries, .. } => {
                out.push_str(&summary_table(summaries).to_string());
            }
            RaceOutcome::Failed { error } => {
                let _ = writeln!(out, "Failed: {}", error);
            }
        }
        out.push('\n');
    }

    out
}

fn race_heading(race: &RaceTrend) -> String {
    match race.electoral_votes {
        Some(ev) => format!("{} ({} electoral votes)", race.name, ev),
        None => race.name.clone(),
    }
}

/// Newest summary of every race
fn overview_table(races: &[RaceTrend]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row![
        "Race",
        "In the lead",
        "Lead",
        "Votes remaining (est.)",
        "Hurdle",
        "Hurdle change",
        "Trailing trend"
    ]);

    for race in races {
        match race.latest() {
            Some(s) => {
                table.add_row(row![
                    race.name,
                    s.leading_candidate_name,
                    signed_count(s.vote_differential),
                    count(s.votes_remaining),
                    percent(s.hurdle),
                    percent_change(s.hurdle_change),
                    optional_percent(s.hurdle_moving_average)
                ]);
            }
            None => {
                table.add_row(row![race.name, "n/a", "n/a", "n/a", "n/a", "n/a", "n/a"]);
            }
        }
    }

    table
}

/// Every summary of one race, most recent first
fn summary_table(summaries: &[Summary]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row![
        "Timestamp",
        "In the lead",
        "Vote differential",
        "Votes remaining (est.)",
        "New votes",
        "Leading share",
        "Trailing share",
        "Precincts",
        "Hurdle",
        "Hurdle change",
        "Trailing trend"
    ]);

    for s in summaries {
        let (leading_share, trailing_share) = match s.partition {
            Some(p) => (percent(p.leading), percent(p.trailing)),
            None => ("n/a".to_string(), "n/a".to_string()),
        };
        table.add_row(row![
            s.timestamp.format(TIMESTAMP_FORMAT),
            s.leading_candidate_name,
            signed_count(s.vote_differential),
            count(s.votes_remaining),
            count(s.new_votes),
            leading_share,
            trailing_share,
            format!("{}/{}", s.precincts_reporting, s.precincts_total),
            percent(s.hurdle),
            percent_change(s.hurdle_change),
            optional_percent(s.hurdle_moving_average)
        ]);
    }

    table
}
