//! [`RefreshEngine`] — decides per request whether the persisted selection is
//! still valid, and replaces it atomically when it is not.
//!
//! The engine keeps no selection in memory. Every call reads the persisted
//! timestamps, so several processes sharing one database agree on staleness.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
  Error, Result,
  clock::{Clock, SystemClock},
  entity::{Selection, Snapshot},
  policy,
  store::{RefreshOutcome, SelectionStore},
};

pub struct RefreshEngine<S, C = SystemClock> {
  store:        S,
  clock:        C,
  /// Held while refreshing so concurrent stale requests refresh once.
  refresh_lock: Mutex<()>,
}

impl<S: SelectionStore> RefreshEngine<S> {
  pub fn new(store: S) -> Self { Self::with_clock(store, SystemClock) }
}

impl<S: SelectionStore, C: Clock> RefreshEngine<S, C> {
  pub fn with_clock(store: S, clock: C) -> Self {
    Self { store, clock, refresh_lock: Mutex::new(()) }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn clock(&self) -> &C { &self.clock }

  /// Return today's selection, refreshing every kind first if the persisted
  /// group is stale or incomplete.
  ///
  /// Fails with [`Error::NoData`] if a refresh was needed and any catalog is
  /// empty; in that case nothing is written.
  pub async fn current(&self) -> Result<Selection> {
    let snapshot = self.store.read_snapshot().await.map_err(Error::store)?;
    if let Some(selection) = fresh(snapshot, self.clock.now()) {
      tracing::debug!("serving cached selection");
      return Ok(selection);
    }

    let _guard = self.refresh_lock.lock().await;

    // Another request may have refreshed while we waited for the lock.
    let now = self.clock.now();
    let snapshot = self.store.read_snapshot().await.map_err(Error::store)?;
    if let Some(selection) = fresh(snapshot, now) {
      return Ok(selection);
    }

    match self.store.refresh_all(now).await.map_err(Error::store)? {
      RefreshOutcome::Refreshed(selection) => {
        tracing::info!(
          character = selection.character.entity.id,
          bankai = selection.bankai.entity.id,
          schrift = selection.schrift.entity.id,
          at = %selection.character.last_updated,
          "selection refreshed"
        );
        Ok(selection)
      }
      RefreshOutcome::EmptyCatalog(kind) => {
        tracing::warn!(%kind, "refresh aborted: catalog is empty");
        Err(Error::NoData(kind))
      }
    }
  }

  /// When the persisted group next goes stale. `None` means it already is.
  pub async fn next_refresh_at(&self) -> Result<Option<DateTime<Utc>>> {
    let snapshot = self.store.read_snapshot().await.map_err(Error::store)?;
    Ok(policy::next_refresh_at(snapshot.timestamps()))
  }
}

fn fresh(snapshot: Snapshot, now: DateTime<Utc>) -> Option<Selection> {
  if policy::is_stale(snapshot.timestamps(), now) {
    None
  } else {
    snapshot.complete()
  }
}
