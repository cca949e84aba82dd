//! Revision events — the fundamental unit of a document's turnaround history.
//!
//! An event records that a controlled document was sent to the client
//! ([`EventType::Submitted`]) or came back ([`EventType::Received`]). Events
//! are never updated or deleted; corrections are recorded as new events.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Event type ──────────────────────────────────────────────────────────────

/// Direction of a revision event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
  /// The document was sent to the client for review.
  Submitted,
  /// The document came back from the client.
  Received,
}

impl EventType {
  /// The discriminant string stored in the `event_type` column.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Submitted => "submitted",
      Self::Received => "received",
    }
  }

  /// Human-readable label used by list and history views.
  pub fn label(self) -> &'static str {
    match self {
      Self::Submitted => "Submitted",
      Self::Received => "Received",
    }
  }
}

impl fmt::Display for EventType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for EventType {
  type Err = Error;

  /// Accepts either spelling ("submitted", "Submitted", " RECEIVED ").
  fn from_str(s: &str) -> Result<Self> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("submitted") {
      Ok(Self::Submitted)
    } else if trimmed.eq_ignore_ascii_case("received") {
      Ok(Self::Received)
    } else {
      Err(Error::UnknownEventTypeName(s.to_owned()))
    }
  }
}

// ─── RevisionEvent ───────────────────────────────────────────────────────────

/// A validated, immutable revision event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionEvent {
  pub id:                         Uuid,
  /// The owning document record; opaque to this crate.
  pub record_id:                  Uuid,
  pub event_type:                 EventType,
  /// Free-form revision label, e.g. "Rev-03". Never parsed.
  pub revision_label:             Option<String>,
  pub event_timestamp:            DateTime<Utc>,
  /// Only meaningful on [`EventType::Submitted`] events.
  pub estimated_return_timestamp: Option<DateTime<Utc>>,
  pub notes:                      Option<String>,
  /// Who recorded the event; display only.
  pub actor:                      Option<String>,
}

impl RevisionEvent {
  pub fn is_submission(&self) -> bool { self.event_type == EventType::Submitted }

  /// The revision label, treating a blank string as absent.
  pub fn revision_label(&self) -> Option<&str> {
    self
      .revision_label
      .as_deref()
      .filter(|label| !label.trim().is_empty())
  }

  /// The estimated return instant, ignored on receipts.
  pub fn estimated_return(&self) -> Option<DateTime<Utc>> {
    match self.event_type {
      EventType::Submitted => self.estimated_return_timestamp,
      EventType::Received => None,
    }
  }
}

// ─── RawRevisionEvent ────────────────────────────────────────────────────────

/// An event as handed over by an external collaborator, before validation.
///
/// Anything may be missing or malformed here; [`RevisionEvent::try_from`]
/// decides whether the event is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRevisionEvent {
  pub id:                         Uuid,
  #[serde(default)]
  pub record_id:                  Option<Uuid>,
  #[serde(default)]
  pub event_type:                 Option<String>,
  #[serde(default)]
  pub revision_label:             Option<String>,
  #[serde(default)]
  pub event_timestamp:            Option<DateTime<Utc>>,
  #[serde(default)]
  pub estimated_return_timestamp: Option<DateTime<Utc>>,
  #[serde(default)]
  pub notes:                      Option<String>,
  #[serde(default)]
  pub actor:                      Option<String>,
}

impl From<RevisionEvent> for RawRevisionEvent {
  fn from(e: RevisionEvent) -> Self {
    Self {
      id:                         e.id,
      record_id:                  Some(e.record_id),
      event_type:                 Some(e.event_type.discriminant().to_owned()),
      revision_label:             e.revision_label,
      event_timestamp:            Some(e.event_timestamp),
      estimated_return_timestamp: e.estimated_return_timestamp,
      notes:                      e.notes,
      actor:                      e.actor,
    }
  }
}

impl TryFrom<RawRevisionEvent> for RevisionEvent {
  type Error = Error;

  fn try_from(raw: RawRevisionEvent) -> Result<Self> {
    let record_id = raw.record_id.ok_or(Error::MissingRecordId(raw.id))?;
    let event_timestamp =
      raw.event_timestamp.ok_or(Error::MissingTimestamp(raw.id))?;
    let type_str = raw.event_type.unwrap_or_default();
    let event_type = type_str
      .parse::<EventType>()
      .map_err(|_| Error::UnknownEventType { id: raw.id, value: type_str })?;

    let estimated_return_timestamp = match event_type {
      EventType::Submitted => raw.estimated_return_timestamp,
      EventType::Received => None,
    };

    Ok(Self {
      id: raw.id,
      record_id,
      event_type,
      revision_label: raw.revision_label,
      event_timestamp,
      estimated_return_timestamp,
      notes: raw.notes,
      actor: raw.actor,
    })
  }
}

// ─── NewRevisionEvent ────────────────────────────────────────────────────────

/// Input to [`crate::store::EventStore::append_event`].
/// `id` is always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRevisionEvent {
  pub record_id:                  Uuid,
  pub event_type:                 EventType,
  pub revision_label:             Option<String>,
  /// Defaults to the store's clock when `None`.
  pub event_timestamp:            Option<DateTime<Utc>>,
  pub estimated_return_timestamp: Option<DateTime<Utc>>,
  pub notes:                      Option<String>,
  pub actor:                      Option<String>,
}

impl NewRevisionEvent {
  /// Convenience constructor with all optional fields unset.
  pub fn new(record_id: Uuid, event_type: EventType) -> Self {
    Self {
      record_id,
      event_type,
      revision_label: None,
      event_timestamp: None,
      estimated_return_timestamp: None,
      notes: None,
      actor: None,
    }
  }

  pub fn submitted(record_id: Uuid) -> Self {
    Self::new(record_id, EventType::Submitted)
  }

  pub fn received(record_id: Uuid) -> Self {
    Self::new(record_id, EventType::Received)
  }

  /// Build the stored event, stamping `now` when no timestamp was given and
  /// discarding an estimate attached to a receipt.
  pub fn into_event(self, id: Uuid, now: DateTime<Utc>) -> RevisionEvent {
    let estimated_return_timestamp = match self.event_type {
      EventType::Submitted => self.estimated_return_timestamp,
      EventType::Received => None,
    };
    RevisionEvent {
      id,
      record_id: self.record_id,
      event_type: self.event_type,
      revision_label: self.revision_label,
      event_timestamp: self.event_timestamp.unwrap_or(now),
      estimated_return_timestamp,
      notes: self.notes,
      actor: self.actor,
    }
  }
}
