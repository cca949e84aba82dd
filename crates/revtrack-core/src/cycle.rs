//! Cycle matching — pairing submissions with the receipts that answer them.
//!
//! A single forward scan over the chronological log holds at most one open
//! submission. A receipt closes it; a second submission arriving first turns
//! the earlier one into an [`CycleState::Unresolved`] cycle, so only the most
//! recent submission is ever active for with-client accounting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  days::day_ceil,
  event::{EventType, RevisionEvent},
};

// ─── Types ───────────────────────────────────────────────────────────────────

/// How a derived cycle ended (or didn't).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
  /// Submitted and received back.
  Closed,
  /// Submitted, then superseded by another submission before any receipt.
  Unresolved,
  /// Submitted and still with the client. Only ever the last cycle.
  Open,
  /// A receipt with no pending submission.
  Orphaned,
}

/// One submitted-to-received round trip. Computed, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedCycle {
  pub state:               CycleState,
  pub submission_id:       Option<Uuid>,
  pub receipt_id:          Option<Uuid>,
  /// Absent only for [`CycleState::Orphaned`] cycles.
  pub submitted_at:        Option<DateTime<Utc>>,
  pub received_at:         Option<DateTime<Utc>>,
  /// Present only for [`CycleState::Closed`] cycles.
  pub elapsed_days:        Option<u64>,
  /// Copied from the submission.
  pub estimated_return_at: Option<DateTime<Utc>>,
  /// Revision label of the submission (or of the receipt when orphaned).
  pub revision_label:      Option<String>,
}

/// How an actual return compared with the submission's estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateComparison {
  /// Whole days between actual and estimated return, partial days rounded up.
  pub delta_days:         u64,
  pub is_before_estimate: bool,
}

impl DerivedCycle {
  fn closed(submission: &RevisionEvent, receipt: &RevisionEvent) -> Self {
    Self {
      state:               CycleState::Closed,
      submission_id:       Some(submission.id),
      receipt_id:          Some(receipt.id),
      submitted_at:        Some(submission.event_timestamp),
      received_at:         Some(receipt.event_timestamp),
      elapsed_days:        Some(day_ceil(
        receipt.event_timestamp,
        submission.event_timestamp,
      )),
      estimated_return_at: submission.estimated_return(),
      revision_label:      submission.revision_label().map(str::to_owned),
    }
  }

  fn pending(submission: &RevisionEvent, state: CycleState) -> Self {
    Self {
      state,
      submission_id: Some(submission.id),
      receipt_id: None,
      submitted_at: Some(submission.event_timestamp),
      received_at: None,
      elapsed_days: None,
      estimated_return_at: submission.estimated_return(),
      revision_label: submission.revision_label().map(str::to_owned),
    }
  }

  fn orphaned(receipt: &RevisionEvent) -> Self {
    Self {
      state:               CycleState::Orphaned,
      submission_id:       None,
      receipt_id:          Some(receipt.id),
      submitted_at:        None,
      received_at:         Some(receipt.event_timestamp),
      elapsed_days:        None,
      estimated_return_at: None,
      revision_label:      receipt.revision_label().map(str::to_owned),
    }
  }

  /// `true` if the receiving end of the cycle is known.
  pub fn is_closed(&self) -> bool { self.received_at.is_some() }

  /// `true` if the document is still with the client in this cycle.
  pub fn is_open(&self) -> bool { self.state == CycleState::Open }

  /// Compare the actual return against the estimate, when both are known.
  pub fn estimate_comparison(&self) -> Option<EstimateComparison> {
    let received = self.received_at?;
    let estimated = self.estimated_return_at?;
    Some(EstimateComparison {
      delta_days:         day_ceil(received, estimated),
      is_before_estimate: received < estimated,
    })
  }
}

// ─── Matching ────────────────────────────────────────────────────────────────

/// Pair chronologically sorted events into cycles.
///
/// Every event contributes to exactly one cycle: each submission starts one,
/// each receipt either closes the open one or becomes an orphaned cycle. At
/// most one [`CycleState::Open`] cycle is produced, and only in last position.
pub fn match_cycles(sorted_events: &[RevisionEvent]) -> Vec<DerivedCycle> {
  let mut cycles = Vec::with_capacity(sorted_events.len());
  let mut open_submission: Option<&RevisionEvent> = None;

  for event in sorted_events {
    match event.event_type {
      EventType::Submitted => {
        if let Some(previous) = open_submission.replace(event) {
          tracing::debug!(
            record_id = %previous.record_id,
            event_id = %previous.id,
            "submission superseded before receipt"
          );
          cycles.push(DerivedCycle::pending(previous, CycleState::Unresolved));
        }
      }
      EventType::Received => match open_submission.take() {
        Some(submission) => cycles.push(DerivedCycle::closed(submission, event)),
        None => {
          tracing::debug!(
            record_id = %event.record_id,
            event_id = %event.id,
            "receipt without a pending submission"
          );
          cycles.push(DerivedCycle::orphaned(event));
        }
      },
    }
  }

  if let Some(submission) = open_submission {
    cycles.push(DerivedCycle::pending(submission, CycleState::Open));
  }

  cycles
}
