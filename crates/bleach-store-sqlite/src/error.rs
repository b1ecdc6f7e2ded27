//! Error type for `bleach-store-sqlite`.

use bleach_core::entity::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A candidate of one kind was offered as the selection for another.
  #[error("cannot store a {found} as the current {expected}")]
  KindMismatch {
    expected: EntityKind,
    found:    EntityKind,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
