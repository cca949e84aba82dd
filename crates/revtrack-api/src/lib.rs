//! JSON REST API for revtrack.
//!
//! Exposes an axum [`Router`] backed by any [`revtrack_core::store::EventStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", revtrack_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod etag;
pub mod events;
pub mod records;

use std::sync::Arc;

use axum::{Router, routing::get};
use revtrack_core::store::EventStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: EventStore + Send + Sync + 'static,
{
  Router::new()
    // Records and derived views
    .route("/records", get(records::list::<S>))
    .route(
      "/records/{id}/events",
      get(events::list::<S>).post(events::append::<S>),
    )
    .route("/records/{id}/timeline", get(records::timeline::<S>))
    .route("/records/{id}/status", get(records::status::<S>))
    .route("/records/{id}/last-event", get(records::last_event::<S>))
    .route("/records/{id}/summary", get(records::summary::<S>))
    // Events
    .route("/events/{id}", get(events::get_one::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
