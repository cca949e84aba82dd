//! Error types for `revtrack-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("event {0} has no record id")]
  MissingRecordId(Uuid),

  #[error("event {0} has no event timestamp")]
  MissingTimestamp(Uuid),

  #[error("event {id} has unknown event type {value:?}")]
  UnknownEventType { id: Uuid, value: String },

  #[error("unknown event type discriminant: {0:?}")]
  UnknownEventTypeName(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
