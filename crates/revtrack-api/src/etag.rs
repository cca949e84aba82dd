//! ETag computation for derived views.
//!
//! A derived view is a pure function of the event log and `now`, so the ETag
//! is a SHA-256 over the sorted `(event_id, event_timestamp)` pairs of the log
//! followed by `now` and the caller's fallback revision label. Appending any
//! event changes it; the order the store returned events in does not.

use axum::{
  Json,
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use revtrack_core::log::EventLog;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute an ETag for views derived from `log` as of `now`.
pub fn compute_etag(
  log: &EventLog,
  now: DateTime<Utc>,
  fallback_revision: Option<&str>,
) -> String {
  let mut hasher = Sha256::new();
  for (id, ts) in log.fingerprint() {
    hasher.update(id.as_bytes());
    hasher.update(ts.timestamp_micros().to_le_bytes());
  }
  hasher.update(now.timestamp_micros().to_le_bytes());
  if let Some(label) = fallback_revision {
    hasher.update([0xff]);
    hasher.update(label.as_bytes());
  }
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Respond with `body` tagged by `etag`, or `304 Not Modified` when the
/// request's `If-None-Match` already names it.
pub fn tagged_json<T: Serialize>(
  request_headers: &HeaderMap,
  etag: String,
  body: T,
) -> Response {
  let matches = request_headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v.split(',').any(|tag| tag.trim() == etag));

  let mut resp = if matches {
    StatusCode::NOT_MODIFIED.into_response()
  } else {
    Json(body).into_response()
  };
  if let Ok(value) = HeaderValue::from_str(&etag) {
    resp.headers_mut().insert(header::ETAG, value);
  }
  resp
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use revtrack_core::event::{EventType, RevisionEvent};
  use uuid::Uuid;

  use super::*;

  fn event(day: u32) -> RevisionEvent {
    RevisionEvent {
      id: Uuid::new_v4(),
      record_id: Uuid::nil(),
      event_type: EventType::Submitted,
      revision_label: None,
      event_timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
      estimated_return_timestamp: None,
      notes: None,
      actor: None,
    }
  }

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap() }

  #[test]
  fn etag_is_quoted() {
    let etag = compute_etag(&EventLog::default(), now(), None);
    assert!(etag.starts_with('"') && etag.ends_with('"'));
  }

  #[test]
  fn etag_stable_across_input_order() {
    let a = event(1);
    let b = event(2);
    let x = EventLog::from_events(vec![a.clone(), b.clone()]);
    let y = EventLog::from_events(vec![b, a]);
    assert_eq!(compute_etag(&x, now(), None), compute_etag(&y, now(), None));
  }

  #[test]
  fn etag_changes_when_event_appended() {
    let a = event(1);
    let before = EventLog::from_events(vec![a.clone()]);
    let after = EventLog::from_events(vec![a, event(3)]);
    assert_ne!(compute_etag(&before, now(), None), compute_etag(&after, now(), None));
  }

  #[test]
  fn etag_changes_with_now() {
    let log = EventLog::from_events(vec![event(1)]);
    let later = now() + chrono::Duration::days(1);
    assert_ne!(compute_etag(&log, now(), None), compute_etag(&log, later, None));
  }

  #[test]
  fn etag_changes_with_fallback_revision() {
    let log = EventLog::from_events(vec![event(1)]);
    assert_ne!(
      compute_etag(&log, now(), None),
      compute_etag(&log, now(), Some("Rev-02"))
    );
  }

  #[test]
  fn if_none_match_yields_304() {
    let etag = compute_etag(&EventLog::default(), now(), None);
    let mut headers = HeaderMap::new();
    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_str(&etag).unwrap());
    let resp = tagged_json(&headers, etag.clone(), serde_json::json!({}));
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(resp.headers().get(header::ETAG).unwrap(), etag.as_str());
  }
}
