//! Handlers for the derived views of a record.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/records` | One [`RecordOverview`] per record with events |
//! | `GET`  | `/records/:id/timeline` | Cycles + statistics |
//! | `GET`  | `/records/:id/status` | Compact display status |
//! | `GET`  | `/records/:id/last-event` | 404 when the log is empty |
//! | `GET`  | `/records/:id/summary` | Everything above in one response |
//!
//! Every endpoint takes an optional `?now=<RFC 3339>`. Without it the clock is
//! read once per request and that single instant is used for every figure in
//! the response.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::HeaderMap,
  response::Response,
};
use chrono::{DateTime, Utc};
use revtrack_core::{
  cycle::{DerivedCycle, EstimateComparison, match_cycles},
  last_event::resolve_last_event,
  log::EventLog,
  status::project_status,
  store::EventStore,
  summary::{RecordOverview, RecordSummary},
  timeline::{TimelineStatistics, analyze},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::ApiError,
  etag::{compute_etag, tagged_json},
  events::load_log,
};

#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
  /// The instant to measure against. Defaults to the server clock.
  pub now:               Option<DateTime<Utc>>,
  /// The record's currently-known revision, used when the last event has no
  /// label of its own.
  pub fallback_revision: Option<String>,
}

impl ViewParams {
  fn now(&self) -> DateTime<Utc> { self.now.unwrap_or_else(Utc::now) }

  fn etag(&self, log: &EventLog, now: DateTime<Utc>) -> String {
    compute_etag(log, now, self.fallback_revision.as_deref())
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// Query for the record list. A fallback revision belongs to one record, so
/// the list only takes `now`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub now: Option<DateTime<Utc>>,
}

/// `GET /records[?now=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<RecordOverview>>, ApiError>
where
  S: EventStore,
{
  let now = params.now.unwrap_or_else(Utc::now);
  let record_ids = store.list_records().await.map_err(ApiError::store)?;

  let mut overviews = Vec::with_capacity(record_ids.len());
  for record_id in record_ids {
    let log = load_log(store.as_ref(), record_id).await?;
    overviews.push(RecordOverview::compute(record_id, &log, None, now));
  }
  Ok(Json(overviews))
}

// ─── Timeline ─────────────────────────────────────────────────────────────────

/// A cycle together with its estimate comparison, when one applies.
#[derive(Debug, Serialize)]
pub struct CycleView {
  #[serde(flatten)]
  pub cycle:    DerivedCycle,
  pub estimate: Option<EstimateComparison>,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
  pub record_id:  Uuid,
  pub as_of:      DateTime<Utc>,
  pub cycles:     Vec<CycleView>,
  pub statistics: TimelineStatistics,
}

/// `GET /records/:id/timeline[?now=...]`
pub async fn timeline<S>(
  State(store): State<Arc<S>>,
  Path(record_id): Path<Uuid>,
  Query(params): Query<ViewParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: EventStore,
{
  let now = params.now();
  let log = load_log(store.as_ref(), record_id).await?;
  let cycles = match_cycles(&log);
  let statistics = analyze(&cycles, now);

  let body = TimelineResponse {
    record_id,
    as_of: now,
    cycles: cycles
      .into_iter()
      .map(|cycle| CycleView { estimate: cycle.estimate_comparison(), cycle })
      .collect(),
    statistics,
  };
  Ok(tagged_json(&headers, params.etag(&log, now), body))
}

// ─── Status ───────────────────────────────────────────────────────────────────

/// `GET /records/:id/status[?now=...]`
pub async fn status<S>(
  State(store): State<Arc<S>>,
  Path(record_id): Path<Uuid>,
  Query(params): Query<ViewParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: EventStore,
{
  let now = params.now();
  let log = load_log(store.as_ref(), record_id).await?;
  let body = project_status(&log, now);
  Ok(tagged_json(&headers, params.etag(&log, now), body))
}

// ─── Last event ───────────────────────────────────────────────────────────────

/// `GET /records/:id/last-event[?now=...][&fallback_revision=...]`
pub async fn last_event<S>(
  State(store): State<Arc<S>>,
  Path(record_id): Path<Uuid>,
  Query(params): Query<ViewParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: EventStore,
{
  let now = params.now();
  let log = load_log(store.as_ref(), record_id).await?;
  let body = resolve_last_event(&log, params.fallback_revision.as_deref(), now)
    .ok_or_else(|| ApiError::NotFound(format!("record {record_id} has no events")))?;
  Ok(tagged_json(&headers, params.etag(&log, now), body))
}

// ─── Summary ──────────────────────────────────────────────────────────────────

/// `GET /records/:id/summary[?now=...][&fallback_revision=...]`
pub async fn summary<S>(
  State(store): State<Arc<S>>,
  Path(record_id): Path<Uuid>,
  Query(params): Query<ViewParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: EventStore,
{
  let now = params.now();
  let log = load_log(store.as_ref(), record_id).await?;
  let body = RecordSummary::compute(
    record_id,
    &log,
    params.fallback_revision.as_deref(),
    now,
  );
  Ok(tagged_json(&headers, params.etag(&log, now), body))
}
