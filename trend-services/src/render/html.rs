//! Standalone HTML page

use std::fmt::Write;
use trend_core::Summary;

use super::{count, optional_percent, percent, percent_change, signed_count};
use crate::tracker::{RaceOutcome, RaceTrend, TrendReport};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
table{border-collapse:collapse;margin-bottom:2em}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:right}\
th:first-child,td:first-child{text-align:left}\
tr.worse td{background:#fde8e8}\
tr.better td{background:#e6f6e6}\
.failed{color:#a00}";

/// Render the report as a standalone HTML page
pub fn render_html(report: &TrendReport) -> String {
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Election trends</title>\n");
    let _ = writeln!(out, "<style>{}</style>", STYLE);
    out.push_str("</head>\n<body>\n<h1>Election trends</h1>\n");

    let _ = write!(
        out,
        "<p>Generated {}",
        report.generated_at.format(TIMESTAMP_FORMAT)
    );
    if let Some(latest) = report.latest_capture {
        let _ = write!(
            out,
            " &middot; latest capture {} ({} captures)",
            latest.format(TIMESTAMP_FORMAT),
            report.captures
        );
    }
    out.push_str("</p>\n");

    for race in &report.races {
        write_race(&mut out, race);
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn write_race(out: &mut String, race: &RaceTrend) {
    let anchor = escape(&race.name.to_lowercase().replace(' ', "-"));
    let _ = write!(out, "<h2 id=\"{}\">{}", anchor, escape(&race.name));
    if let Some(ev) = race.electoral_votes {
        let _ = write!(out, " <small>({} electoral votes)</small>", ev);
    }
    out.push_str("</h2>\n");

    match &race.outcome {
        RaceOutcome::Tracked { summaries, .. } => write_table(out, summaries),
        RaceOutcome::Failed { error } => {
            let _ = writeln!(out, "<p class=\"failed\">Failed: {}</p>", escape(error));
        }
    }
}

fn write_table(out: &mut String, summaries: &[Summary]) {
    out.push_str("<table>\n<thead><tr>");
    for title in [
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
        "Trailing trend",
    ] {
        let _ = write!(out, "<th>{}</th>", title);
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for s in summaries {
        let (leading_share, trailing_share) = match s.partition {
            Some(p) => (percent(p.leading), percent(p.trailing)),
            None => ("n/a".to_string(), "n/a".to_string()),
        };
        let cells = [
            s.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            escape(&s.leading_candidate_name),
            signed_count(s.vote_differential),
            count(s.votes_remaining),
            count(s.new_votes),
            leading_share,
            trailing_share,
            format!("{}/{}", s.precincts_reporting, s.precincts_total),
            percent(s.hurdle),
            percent_change(s.hurdle_change),
            optional_percent(s.hurdle_moving_average),
        ];

        match row_class(s) {
            Some(class) => {
                let _ = write!(out, "<tr class=\"{}\">", class);
            }
            None => out.push_str("<tr>"),
        }
        for cell in cells {
            let _ = write!(out, "<td>{}</td>", cell);
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n");
}

/// Whether the trailing candidate's path got harder or easier
fn row_class(summary: &Summary) -> Option<&'static str> {
    if summary.new_votes == 0 {
        return None;
    }
    if summary.hurdle_change > 0.0 {
        Some("worse")
    } else if summary.hurdle_change < 0.0 {
        Some("better")
    } else {
        None
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
