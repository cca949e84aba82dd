//! [`EventLog`] — the chronological, validated view over a record's events.
//!
//! Callers hand over events in whatever order the store returned them. The
//! log drops what it cannot use and sorts the rest, so every downstream step
//! can rely on chronological order.

use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Result,
  event::{RawRevisionEvent, RevisionEvent},
};

/// Validated events in ascending `event_timestamp` order.
///
/// Events sharing a timestamp keep their input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventLog {
  events: Vec<RevisionEvent>,
}

impl EventLog {
  /// Validate and sort raw events. Events that fail validation are dropped.
  pub fn normalize(raw: impl IntoIterator<Item = RawRevisionEvent>) -> Self {
    let events = raw
      .into_iter()
      .filter_map(|r| match RevisionEvent::try_from(r) {
        Ok(event) => Some(event),
        Err(e) => {
          tracing::debug!(error = %e, "dropping invalid revision event");
          None
        }
      })
      .collect();
    Self::from_events(events)
  }

  /// Sort already-validated events.
  pub fn from_events(mut events: Vec<RevisionEvent>) -> Self {
    // `sort_by_key` is stable, which keeps ties in input order.
    events.sort_by_key(|e| e.event_timestamp);
    Self { events }
  }

  /// Parse a JSON array of raw events and normalize it.
  ///
  /// Only the array itself must parse. Each element is decoded on its own, so
  /// a malformed event is dropped without taking the rest of the log with it.
  pub fn from_json(json: &str) -> Result<Self> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let raw = values.into_iter().enumerate().filter_map(|(index, value)| {
      match serde_json::from_value::<RawRevisionEvent>(value) {
        Ok(raw) => Some(raw),
        Err(e) => {
          tracing::debug!(index, error = %e, "dropping undecodable revision event");
          None
        }
      }
    });
    Ok(Self::normalize(raw))
  }

  pub fn events(&self) -> &[RevisionEvent] { &self.events }

  /// Split a log holding several records into one log per record.
  ///
  /// Records are returned in order of their first event. Each sub-log keeps
  /// the chronological order of this one.
  pub fn split_by_record(&self) -> Vec<(Uuid, EventLog)> {
    let mut logs: Vec<(Uuid, EventLog)> = Vec::new();
    for event in &self.events {
      match logs.iter_mut().find(|(id, _)| *id == event.record_id) {
        Some((_, log)) => log.events.push(event.clone()),
        None => logs.push((event.record_id, Self { events: vec![event.clone()] })),
      }
    }
    logs
  }

  /// Only the events belonging to `record_id`.
  pub fn for_record(&self, record_id: Uuid) -> EventLog {
    let events = self
      .events
      .iter()
      .filter(|e| e.record_id == record_id)
      .cloned()
      .collect();
    Self { events }
  }

  /// Sorted `(id, event_timestamp)` pairs; enough to tell two logs apart.
  pub fn fingerprint(&self) -> Vec<(Uuid, DateTime<Utc>)> {
    let mut pairs: Vec<_> =
      self.events.iter().map(|e| (e.id, e.event_timestamp)).collect();
    pairs.sort();
    pairs
  }
}

impl Deref for EventLog {
  type Target = [RevisionEvent];

  fn deref(&self) -> &Self::Target { &self.events }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::event::EventType;

  fn raw(kind: &str, day: u32) -> RawRevisionEvent {
    RawRevisionEvent {
      id: Uuid::new_v4(),
      record_id: Some(Uuid::nil()),
      event_type: Some(kind.into()),
      event_timestamp: Some(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
      ..Default::default()
    }
  }

  #[test]
  fn sorts_by_timestamp() {
    let log = EventLog::normalize(vec![
      raw("received", 10),
      raw("submitted", 1),
      raw("submitted", 20),
    ]);
    let days: Vec<u32> = log
      .iter()
      .map(|e| chrono::Datelike::day(&e.event_timestamp))
      .collect();
    assert_eq!(days, vec![1, 10, 20]);
  }

  #[test]
  fn ties_keep_input_order() {
    let a = raw("submitted", 5);
    let b = raw("received", 5);
    let (a_id, b_id) = (a.id, b.id);

    let log = EventLog::normalize(vec![a.clone(), b.clone()]);
    assert_eq!(log[0].id, a_id);
    assert_eq!(log[1].id, b_id);

    let log = EventLog::normalize(vec![b, a]);
    assert_eq!(log[0].id, b_id);
    assert_eq!(log[1].id, a_id);
  }

  #[test]
  fn invalid_events_are_dropped_not_fatal() {
    let mut no_ts = raw("submitted", 1);
    no_ts.event_timestamp = None;
    let mut no_record = raw("submitted", 2);
    no_record.record_id = None;
    let bad_type = raw("approved", 3);

    let log = EventLog::normalize(vec![
      no_ts,
      raw("submitted", 4),
      no_record,
      bad_type,
      raw("received", 6),
    ]);
    let kinds: Vec<EventType> = log.iter().map(|e| e.event_type).collect();
    assert_eq!(kinds, vec![EventType::Submitted, EventType::Received]);
  }

  #[test]
  fn empty_input_is_empty_log() {
    let log = EventLog::normalize(Vec::new());
    assert!(log.is_empty());
    assert!(log.fingerprint().is_empty());
  }

  #[test]
  fn from_json_accepts_partial_records() {
    let json = r#"[
      {"id":"00000000-0000-0000-0000-000000000001",
       "record_id":"00000000-0000-0000-0000-0000000000aa",
       "event_type":"Submitted",
       "event_timestamp":"2024-01-01T00:00:00Z"},
      {"id":"00000000-0000-0000-0000-000000000002",
       "event_type":"received"}
    ]"#;
    let log = EventLog::from_json(json).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].event_type, EventType::Submitted);
  }

  #[test]
  fn from_json_drops_event_without_id() {
    let json = r#"[
      {"id":"00000000-0000-0000-0000-000000000001",
       "record_id":"00000000-0000-0000-0000-0000000000aa",
       "event_type":"submitted",
       "event_timestamp":"2024-01-01T00:00:00Z"},
      {"record_id":"00000000-0000-0000-0000-0000000000aa",
       "event_type":"received",
       "event_timestamp":"2024-01-05T00:00:00Z"}
    ]"#;
    let log = EventLog::from_json(json).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].event_type, EventType::Submitted);
  }

  #[test]
  fn from_json_drops_event_with_garbage_timestamp() {
    let json = r#"[
      {"id":"00000000-0000-0000-0000-000000000001",
       "record_id":"00000000-0000-0000-0000-0000000000aa",
       "event_type":"submitted",
       "event_timestamp":"2024-01-01T00:00:00Z"},
      {"id":"00000000-0000-0000-0000-000000000002",
       "record_id":"00000000-0000-0000-0000-0000000000aa",
       "event_type":"received",
       "event_timestamp":"not a date"},
      "not even an object"
    ]"#;
    let log = EventLog::from_json(json).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].event_type, EventType::Submitted);
  }

  #[test]
  fn from_json_rejects_non_array() {
    assert!(EventLog::from_json(r#"{"id": 1}"#).is_err());
  }

  #[test]
  fn split_by_record_keeps_records_apart() {
    let a = Uuid::from_u128(0xaa);
    let b = Uuid::from_u128(0xbb);
    let mut b_received = raw("received", 10);
    b_received.record_id = Some(b);
    let mut a_submitted = raw("submitted", 1);
    a_submitted.record_id = Some(a);
    let mut a_received = raw("received", 12);
    a_received.record_id = Some(a);

    let log = EventLog::normalize(vec![b_received, a_received, a_submitted]);
    let split = log.split_by_record();

    assert_eq!(split.len(), 2);
    assert_eq!(split[0].0, a);
    assert_eq!(split[0].1.len(), 2);
    assert!(split[0].1.windows(2).all(|w| w[0].event_timestamp <= w[1].event_timestamp));
    assert_eq!(split[1].0, b);
    assert_eq!(split[1].1.len(), 1);

    assert_eq!(log.for_record(b), split[1].1);
    assert!(log.for_record(Uuid::from_u128(0xcc)).is_empty());
  }

  #[test]
  fn fingerprint_ignores_input_order() {
    let a = raw("submitted", 1);
    let b = raw("received", 9);
    let x = EventLog::normalize(vec![a.clone(), b.clone()]);
    let y = EventLog::normalize(vec![b, a]);
    assert_eq!(x.fingerprint(), y.fingerprint());
  }
}
