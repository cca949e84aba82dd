//! One-shot computation of every derived view for a record.
//!
//! List rows and the history view both read from here, so the pairing rules
//! are applied exactly once per evaluation and the two can never disagree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  cycle::{DerivedCycle, match_cycles},
  event::RevisionEvent,
  last_event::{LastEvent, resolve_last_event},
  log::EventLog,
  status::{StatusProjection, project_status},
  timeline::{TimelineStatistics, analyze},
};

/// The full derived read model for a record — never stored, always computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
  pub record_id:  Uuid,
  /// The instant every day count was measured against.
  pub as_of:      DateTime<Utc>,
  pub events:     Vec<RevisionEvent>,
  pub cycles:     Vec<DerivedCycle>,
  pub statistics: TimelineStatistics,
  pub status:     StatusProjection,
  pub last_event: Option<LastEvent>,
}

/// The compact subset shown in a record list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOverview {
  pub record_id:  Uuid,
  pub status:     StatusProjection,
  pub last_event: Option<LastEvent>,
}

impl RecordSummary {
  /// Derive everything from a normalized log as of `now`.
  pub fn compute(
    record_id: Uuid,
    log: &EventLog,
    fallback_revision_label: Option<&str>,
    now: DateTime<Utc>,
  ) -> Self {
    let cycles = match_cycles(log);
    let statistics = analyze(&cycles, now);
    Self {
      record_id,
      as_of: now,
      events: log.events().to_vec(),
      cycles,
      statistics,
      status: project_status(log, now),
      last_event: resolve_last_event(log, fallback_revision_label, now),
    }
  }

  pub fn overview(&self) -> RecordOverview {
    RecordOverview {
      record_id:  self.record_id,
      status:     self.status.clone(),
      last_event: self.last_event.clone(),
    }
  }
}

impl RecordOverview {
  pub fn compute(
    record_id: Uuid,
    log: &EventLog,
    fallback_revision_label: Option<&str>,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      record_id,
      status: project_status(log, now),
      last_event: resolve_last_event(log, fallback_revision_label, now),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::{event::EventType, status::StatusLabel};

  fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 0, 0, 0).unwrap()
  }

  fn event(record_id: Uuid, event_type: EventType, ts: DateTime<Utc>) -> RevisionEvent {
    RevisionEvent {
      id: Uuid::new_v4(),
      record_id,
      event_type,
      revision_label: Some("Rev-03".into()),
      event_timestamp: ts,
      estimated_return_timestamp: None,
      notes: None,
      actor: None,
    }
  }

  #[test]
  fn summary_views_agree() {
    let record_id = Uuid::new_v4();
    let log = EventLog::from_events(vec![
      event(record_id, EventType::Submitted, at(1, 20)),
      event(record_id, EventType::Received, at(1, 10)),
      event(record_id, EventType::Submitted, at(1, 1)),
    ]);
    let summary = RecordSummary::compute(record_id, &log, None, at(1, 25));

    assert_eq!(summary.events.len(), 3);
    assert_eq!(summary.cycles.len(), 2);
    assert!(summary.statistics.pending_with_client);
    assert_eq!(summary.status.label, StatusLabel::WithClient);
    assert_eq!(summary.status.days_with_client, summary.statistics.open_cycle_days);
    assert_eq!(
      summary.last_event.as_ref().map(|l| l.event.event_timestamp),
      Some(at(1, 20))
    );
  }

  #[test]
  fn overview_matches_summary_subset() {
    let record_id = Uuid::new_v4();
    let log = EventLog::from_events(vec![
      event(record_id, EventType::Submitted, at(1, 1)),
      event(record_id, EventType::Received, at(1, 10)),
    ]);
    let now = at(2, 1);
    let summary = RecordSummary::compute(record_id, &log, Some("Rev-09"), now);
    let overview = RecordOverview::compute(record_id, &log, Some("Rev-09"), now);
    assert_eq!(summary.overview(), overview);
  }

  #[test]
  fn empty_summary() {
    let record_id = Uuid::new_v4();
    let summary = RecordSummary::compute(record_id, &EventLog::default(), None, at(1, 1));
    assert!(summary.cycles.is_empty());
    assert_eq!(summary.statistics, TimelineStatistics::default());
    assert_eq!(summary.status.label, StatusLabel::NoEvents);
    assert_eq!(summary.last_event, None);
  }
}
