//! Compact status for list views.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  days::day_ceil,
  event::{EventType, RevisionEvent},
};

/// Short display status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusLabel {
  #[serde(rename = "No events")]
  NoEvents,
  #[serde(rename = "With Client")]
  WithClient,
  #[serde(rename = "Received")]
  Received,
}

impl StatusLabel {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::NoEvents => "No events",
      Self::WithClient => "With Client",
      Self::Received => "Received",
    }
  }
}

impl fmt::Display for StatusLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusProjection {
  pub label:                      StatusLabel,
  pub days_since_last_event:      Option<u64>,
  /// Set whenever any submission exists, received back or not.
  pub days_since_last_submission: Option<u64>,
  /// Set only while the document is with the client.
  pub days_with_client:           Option<u64>,
}

/// Project the display status of a chronologically sorted log as of `now`.
pub fn project_status(
  sorted_events: &[RevisionEvent],
  now: DateTime<Utc>,
) -> StatusProjection {
  let Some(last) = sorted_events.last() else {
    return StatusProjection {
      label:                      StatusLabel::NoEvents,
      days_since_last_event:      None,
      days_since_last_submission: None,
      days_with_client:           None,
    };
  };

  let since_last = day_ceil(now, last.event_timestamp);

  // The last event cannot have a later receipt, so a trailing submission is
  // always outstanding.
  let (label, days_with_client) = match last.event_type {
    EventType::Submitted => (StatusLabel::WithClient, Some(since_last)),
    EventType::Received => (StatusLabel::Received, None),
  };

  let days_since_last_submission = sorted_events
    .iter()
    .rev()
    .find(|e| e.is_submission())
    .map(|e| day_ceil(now, e.event_timestamp));

  StatusProjection {
    label,
    days_since_last_event: Some(since_last),
    days_since_last_submission,
    days_with_client,
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use uuid::Uuid;

  use super::*;

  fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 0, 0, 0).unwrap()
  }

  fn event(event_type: EventType, ts: DateTime<Utc>) -> RevisionEvent {
    RevisionEvent {
      id: Uuid::new_v4(),
      record_id: Uuid::nil(),
      event_type,
      revision_label: None,
      event_timestamp: ts,
      estimated_return_timestamp: None,
      notes: None,
      actor: None,
    }
  }

  #[test]
  fn no_events() {
    let s = project_status(&[], at(1, 1));
    assert_eq!(s.label, StatusLabel::NoEvents);
    assert_eq!(s.label.to_string(), "No events");
    assert_eq!(s.days_since_last_event, None);
    assert_eq!(s.days_since_last_submission, None);
    assert_eq!(s.days_with_client, None);
  }

  #[test]
  fn open_submission_is_with_client() {
    let s = project_status(&[event(EventType::Submitted, at(1, 1))], at(1, 15));
    assert_eq!(s.label, StatusLabel::WithClient);
    assert_eq!(s.days_with_client, Some(14));
    assert_eq!(s.days_since_last_event, Some(14));
    assert_eq!(s.days_since_last_submission, Some(14));
  }

  #[test]
  fn received_back() {
    let s = project_status(
      &[
        event(EventType::Submitted, at(1, 1)),
        event(EventType::Received, at(1, 10)),
      ],
      at(2, 1),
    );
    assert_eq!(s.label, StatusLabel::Received);
    assert_eq!(s.days_with_client, None);
    assert_eq!(s.days_since_last_event, Some(22));
    assert_eq!(s.days_since_last_submission, Some(31));
  }

  #[test]
  fn resubmission_counts_only_the_running_cycle() {
    let s = project_status(
      &[
        event(EventType::Submitted, at(1, 1)),
        event(EventType::Received, at(1, 10)),
        event(EventType::Submitted, at(1, 20)),
      ],
      at(1, 25),
    );
    assert_eq!(s.label, StatusLabel::WithClient);
    assert_eq!(s.days_with_client, Some(5));
  }

  #[test]
  fn orphaned_receipt_only() {
    let s = project_status(&[event(EventType::Received, at(1, 3))], at(1, 4));
    assert_eq!(s.label, StatusLabel::Received);
    assert_eq!(s.days_since_last_event, Some(1));
    assert_eq!(s.days_since_last_submission, None);
  }

  #[test]
  fn label_serializes_as_display_text() {
    let json = serde_json::to_string(&StatusLabel::WithClient).unwrap();
    assert_eq!(json, "\"With Client\"");
  }
}
