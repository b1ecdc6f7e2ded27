//! The `SelectionStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `bleach-store-sqlite`).
//! The refresh engine and HTTP layer depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::entity::{Candidate, Current, EntityKind, Selection, Snapshot};

/// Result of an attempted group refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
  /// Every kind received a new pick; all rows share the same timestamp.
  Refreshed(Selection),
  /// The catalog for this kind is empty. Nothing was written.
  EmptyCatalog(EntityKind),
}

/// Typed access to the candidate catalogs and their singleton
/// current-selection rows.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SelectionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Pick one candidate of `kind` uniformly at random from the stored rows.
  /// Returns `None` if the catalog is empty.
  fn fetch_random(
    &self,
    kind: EntityKind,
  ) -> impl Future<Output = Result<Option<Candidate>, Self::Error>> + Send + '_;

  /// Read the persisted selection for `kind`. `None` if never written.
  fn read_current(
    &self,
    kind: EntityKind,
  ) -> impl Future<Output = Result<Option<Current<Candidate>>, Self::Error>>
  + Send
  + '_;

  /// Upsert the singleton row for `kind`, stamping it with `at` truncated to
  /// whole seconds. Readers see either the previous row or the new one.
  fn write_current(
    &self,
    kind: EntityKind,
    candidate: Candidate,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Current<Candidate>, Self::Error>>
  + Send
  + '_;

  /// Read every kind's current selection as one consistent view.
  fn read_snapshot(
    &self,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;

  /// Pick a fresh candidate for every kind and persist them all in a single
  /// transaction. If any catalog is empty the transaction is rolled back and
  /// [`RefreshOutcome::EmptyCatalog`] is returned.
  fn refresh_all(
    &self,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<RefreshOutcome, Self::Error>> + Send + '_;
}
