//! The single most recent event, for "last activity" summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{days::day_ceil, event::RevisionEvent};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEvent {
  pub event:                 RevisionEvent,
  /// `"Submitted"` or `"Received"`.
  pub event_type_label:      String,
  /// The event's own label, else the caller's fallback.
  pub revision_label:        Option<String>,
  pub days_since_last_event: u64,
}

/// Resolve the last event of a chronologically sorted log.
///
/// `fallback_revision_label` is the record's currently-known revision; it is
/// used when the event itself carries no label.
pub fn resolve_last_event(
  sorted_events: &[RevisionEvent],
  fallback_revision_label: Option<&str>,
  now: DateTime<Utc>,
) -> Option<LastEvent> {
  let event = sorted_events.last()?;

  let revision_label = event
    .revision_label()
    .or(fallback_revision_label)
    .map(str::to_owned);

  Some(LastEvent {
    event_type_label: event.event_type.label().to_owned(),
    revision_label,
    days_since_last_event: day_ceil(now, event.event_timestamp),
    event: event.clone(),
  })
}
