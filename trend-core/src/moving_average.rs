//! Votes-weighted trend of the trailing candidate's recent share

use crate::summary::Summary;

/// Number of accepted summaries the trend looks back over
pub const MOVING_AVERAGE_WINDOW: usize = 5;

/// Trailing candidate's share of new votes across the most recent `window` summaries
///
/// `recent` must yield summaries most-recent-first. Returns `None` until
/// `window` summaries exist, and when none of them added votes. Increments
/// with no new votes or with downward revisions are left out of both sums.
pub fn moving_average<'a, I>(recent: I, window: usize) -> Option<f64>
where
    I: IntoIterator<Item = &'a Summary>,
{
    let entries: Vec<&Summary> = recent.into_iter().take(window).collect();
    if entries.len() < window {
        return None;
    }

    let (agg_votes, agg_trailing_votes) = entries
        .iter()
        .filter(|s| s.new_votes > 0)
        .fold((0i64, 0.0f64), |(votes, trailing), s| {
            let won = (s.trailing_candidate_partition() * s.new_votes as f64).round_ties_even();
            (votes + s.new_votes, trailing + won)
        });

    if agg_votes == 0 {
        return None;
    }
    Some(agg_trailing_votes / agg_votes as f64)
}
