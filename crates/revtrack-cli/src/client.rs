//! Async HTTP client wrapping the revtrack JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use revtrack_core::{
  event::{EventType, RevisionEvent},
  status::StatusProjection,
  summary::RecordSummary,
};
use serde::Serialize;
use uuid::Uuid;

/// Connection settings for the revtrack API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Body of `POST /api/records/:id/events`.
#[derive(Debug, Clone, Serialize)]
pub struct AppendRequest {
  pub event_type:                 EventType,
  pub revision_label:             Option<String>,
  pub event_timestamp:            Option<DateTime<Utc>>,
  pub estimated_return_timestamp: Option<DateTime<Utc>>,
  pub notes:                      Option<String>,
  pub actor:                      Option<String>,
}

/// Async HTTP client for the revtrack JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  async fn check(resp: Response, what: &str) -> Result<Response> {
    if resp.status().is_success() {
      return Ok(resp);
    }
    let status = resp.status();
    let detail = resp.text().await.unwrap_or_default();
    Err(anyhow!("{what} → {status}: {detail}"))
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// `GET /api/records/:id/status`
  pub async fn status(
    &self,
    record_id: Uuid,
    now: Option<DateTime<Utc>>,
  ) -> Result<StatusProjection> {
    let mut req = self
      .client
      .get(self.url(&format!("/records/{record_id}/status")));
    if let Some(now) = now {
      req = req.query(&[("now", now.to_rfc3339())]);
    }
    let resp = req.send().await.context("GET /records/:id/status failed")?;
    Self::check(resp, "GET /records/:id/status")
      .await?
      .json()
      .await
      .context("deserialising status")
  }

  /// `GET /api/records/:id/summary`
  pub async fn summary(
    &self,
    record_id: Uuid,
    now: Option<DateTime<Utc>>,
    fallback_revision: Option<&str>,
  ) -> Result<RecordSummary> {
    let mut query: Vec<(&str, String)> = Vec::new();
    if let Some(now) = now {
      query.push(("now", now.to_rfc3339()));
    }
    if let Some(label) = fallback_revision {
      query.push(("fallback_revision", label.to_owned()));
    }
    let resp = self
      .client
      .get(self.url(&format!("/records/{record_id}/summary")))
      .query(&query)
      .send()
      .await
      .context("GET /records/:id/summary failed")?;
    Self::check(resp, "GET /records/:id/summary")
      .await?
      .json()
      .await
      .context("deserialising summary")
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// `POST /api/records/:id/events`
  pub async fn append(
    &self,
    record_id: Uuid,
    body: &AppendRequest,
  ) -> Result<RevisionEvent> {
    let resp = self
      .client
      .post(self.url(&format!("/records/{record_id}/events")))
      .json(body)
      .send()
      .await
      .context("POST /records/:id/events failed")?;
    Self::check(resp, "POST /records/:id/events")
      .await?
      .json()
      .await
      .context("deserialising stored event")
  }
}
