//! The `EventStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `revtrack-store-sqlite`).
//! Higher layers (`revtrack-api`, `revtrack-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::event::{NewRevisionEvent, RawRevisionEvent, RevisionEvent};

/// Abstraction over a revision-event log backend.
///
/// The log is append-only: there is no update or delete. Corrections are
/// new events.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Append a new event and return it as stored. The store assigns the `id`
  /// and stamps its own clock when no timestamp was supplied.
  fn append_event(
    &self,
    input: NewRevisionEvent,
  ) -> impl Future<Output = Result<RevisionEvent, Self::Error>> + Send + '_;

  /// All events of a record, as stored. Order is not guaranteed. Rows whose
  /// columns no longer decode come back with those fields unset, and rows
  /// without a usable id are skipped; callers normalize through
  /// [`EventLog`](crate::log::EventLog).
  fn list_events(
    &self,
    record_id: Uuid,
  ) -> impl Future<Output = Result<Vec<RawRevisionEvent>, Self::Error>> + Send + '_;

  /// Retrieve a single event by id. Returns `None` if not found.
  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<RevisionEvent>, Self::Error>> + Send + '_;

  /// Every record id with at least one event.
  fn list_records(
    &self,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;
}
