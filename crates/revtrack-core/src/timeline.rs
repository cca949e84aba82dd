//! Aggregate turnaround statistics over matched cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{cycle::DerivedCycle, days::day_ceil};

/// Totals for one record's history, as of an explicit instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineStatistics {
  /// Closed-cycle elapsed days plus the running days of an open cycle, summed
  /// over the whole history. For the days of the current cycle alone see
  /// [`open_cycle_days`](Self::open_cycle_days) or
  /// [`StatusProjection::days_with_client`](crate::status::StatusProjection).
  pub days_with_client:    u64,
  /// Days between each receipt and the submission that follows it.
  pub days_worked:         u64,
  pub submission_count:    usize,
  pub receipt_count:       usize,
  /// The last cycle is still with the client.
  pub pending_with_client: bool,
  /// Days the currently open cycle has been with the client.
  pub open_cycle_days:     Option<u64>,
  pub last_submission_at:  Option<DateTime<Utc>>,
}

/// Fold matched cycles into [`TimelineStatistics`].
///
/// Every event lands in exactly one cycle (see
/// [`match_cycles`](crate::cycle::match_cycles)), so counting cycle endpoints
/// counts the events themselves, unresolved submissions and orphaned receipts
/// included.
pub fn analyze(cycles: &[DerivedCycle], now: DateTime<Utc>) -> TimelineStatistics {
  let closed_days: u64 = cycles.iter().filter_map(|c| c.elapsed_days).sum();

  let open_cycle_days = cycles
    .last()
    .filter(|c| c.is_open())
    .and_then(|c| c.submitted_at)
    .map(|submitted_at| day_ceil(now, submitted_at));

  let days_worked: u64 = cycles
    .windows(2)
    .filter_map(|pair| match (pair[0].received_at, pair[1].submitted_at) {
      (Some(received_at), Some(next_submitted_at)) => {
        Some(day_ceil(next_submitted_at, received_at))
      }
      _ => None,
    })
    .sum();

  TimelineStatistics {
    days_with_client: closed_days + open_cycle_days.unwrap_or(0),
    days_worked,
    submission_count: cycles.iter().filter(|c| c.submission_id.is_some()).count(),
    receipt_count: cycles.iter().filter(|c| c.receipt_id.is_some()).count(),
    pending_with_client: open_cycle_days.is_some(),
    open_cycle_days,
    last_submission_at: cycles.iter().rev().find_map(|c| c.submitted_at),
  }
}
