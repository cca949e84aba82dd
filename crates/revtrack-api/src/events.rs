//! Handlers for the event log itself.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/records/:id/events` | Normalized, chronological events |
//! | `POST` | `/records/:id/events` | Body: [`NewEventBody`]; returns 201 + stored event |
//! | `GET`  | `/events/:id` | Single event; 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use revtrack_core::{
  event::{EventType, NewRevisionEvent, RevisionEvent},
  log::EventLog,
  store::EventStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// Fetch and normalize the log of `record_id`.
pub(crate) async fn load_log<S>(store: &S, record_id: Uuid) -> Result<EventLog, ApiError>
where
  S: EventStore,
{
  let raw = store.list_events(record_id).await.map_err(ApiError::store)?;
  Ok(EventLog::normalize(raw))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /records/:id/events`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(record_id): Path<Uuid>,
) -> Result<Json<EventLog>, ApiError>
where
  S: EventStore,
{
  Ok(Json(load_log(store.as_ref(), record_id).await?))
}

// ─── Append ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /records/:id/events`.
#[derive(Debug, Deserialize)]
pub struct NewEventBody {
  pub event_type:                 EventType,
  pub revision_label:             Option<String>,
  /// Defaults to the server clock.
  pub event_timestamp:            Option<DateTime<Utc>>,
  /// Ignored on receipts.
  pub estimated_return_timestamp: Option<DateTime<Utc>>,
  pub notes:                      Option<String>,
  pub actor:                      Option<String>,
}

impl NewEventBody {
  fn into_new_event(self, record_id: Uuid) -> NewRevisionEvent {
    NewRevisionEvent {
      record_id,
      event_type: self.event_type,
      revision_label: self.revision_label,
      event_timestamp: self.event_timestamp,
      estimated_return_timestamp: self.estimated_return_timestamp,
      notes: self.notes,
      actor: self.actor,
    }
  }
}

/// `POST /records/:id/events` — returns 201 + the stored [`RevisionEvent`].
pub async fn append<S>(
  State(store): State<Arc<S>>,
  Path(record_id): Path<Uuid>,
  Json(body): Json<NewEventBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EventStore,
{
  if body.event_type == EventType::Received
    && body.estimated_return_timestamp.is_some()
  {
    tracing::debug!(%record_id, "ignoring estimated return on receipt");
  }

  let event = store
    .append_event(body.into_new_event(record_id))
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    %record_id,
    event_id = %event.id,
    event_type = %event.event_type,
    "revision event recorded"
  );
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /events/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RevisionEvent>, ApiError>
where
  S: EventStore,
{
  let event = store
    .get_event(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
  Ok(Json(event))
}
