//! Startup bootstrap and the optional background refresher.
//!
//! Both go through [`RefreshEngine::current`], so they apply the same
//! staleness rule and the same atomic refresh as request handlers.

use std::{sync::Arc, time::Duration};

use bleach_core::{clock::Clock, refresh::RefreshEngine, store::SelectionStore};

/// Pause after a failed background refresh before trying again.
pub const RETRY_AFTER: Duration = Duration::from_secs(60);

/// Make sure a selection exists before the first request is served.
///
/// An empty catalog is not fatal: requests answer 500 until data arrives.
pub async fn bootstrap<S, C>(
  engine: &RefreshEngine<S, C>,
) -> bleach_core::Result<()>
where
  S: SelectionStore,
  C: Clock,
{
  match engine.current().await {
    Ok(selection) => {
      tracing::info!(
        character = selection.character.entity.id,
        name = ?selection.character.entity.name(),
        last_updated = %selection.character.last_updated,
        "selection ready"
      );
      Ok(())
    }
    Err(bleach_core::Error::NoData(kind)) => {
      tracing::warn!(%kind, "no selection available yet: catalog is empty");
      Ok(())
    }
    Err(e) => Err(e),
  }
}

/// Sleep until the persisted group goes stale, refresh it, repeat.
///
/// Runs forever; spawn it and drop or abort the handle to stop it.
pub async fn run<S, C>(engine: Arc<RefreshEngine<S, C>>)
where
  S: SelectionStore,
  C: Clock,
{
  loop {
    let wait = match engine.next_refresh_at().await {
      Ok(Some(at)) => (at - engine.clock().now()).to_std().unwrap_or_default(),
      Ok(None) => Duration::ZERO,
      Err(e) => {
        tracing::warn!(error = %e, "could not read selection timestamps");
        RETRY_AFTER
      }
    };

    tracing::debug!(?wait, "background refresh scheduled");
    tokio::time::sleep(wait).await;

    if let Err(e) = engine.current().await {
      tracing::warn!(error = %e, "background refresh failed");
      tokio::time::sleep(RETRY_AFTER).await;
    }
  }
}

#[cfg(test)]
mod tests {
  use bleach_core::clock::FixedClock;
  use bleach_store_sqlite::SqliteStore;
  use chrono::{TimeZone as _, Utc};

  use super::*;

  const SEED: &str = "
    INSERT INTO bleach_characters (id, name) VALUES (1, 'Shunsui Kyoraku');
    INSERT INTO bleach_bankai (id, chr_id, bankai) VALUES (1, 1, 'Katen Kyokotsu: Karamatsu Shinju');
    INSERT INTO bleach_schrift (id, chr_id, schrift) VALUES (1, 1, 'X - The X-Axis');
  ";

  async fn engine(seed: &str) -> Arc<RefreshEngine<SqliteStore, FixedClock>> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.seed(seed).await.unwrap();
    let clock =
      FixedClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap());
    Arc::new(RefreshEngine::with_clock(store, clock))
  }

  #[tokio::test]
  async fn bootstrap_creates_selection() {
    let engine = engine(SEED).await;
    bootstrap(&*engine).await.unwrap();

    let snapshot = engine.store().read_snapshot().await.unwrap();
    assert!(snapshot.complete().is_some());
  }

  #[tokio::test]
  async fn bootstrap_tolerates_empty_catalog() {
    let engine = engine("").await;
    bootstrap(&*engine).await.unwrap();

    let snapshot = engine.store().read_snapshot().await.unwrap();
    assert_eq!(snapshot.timestamps(), [None, None, None]);
  }

  #[tokio::test]
  async fn background_task_refreshes_stale_group() {
    let engine = engine(SEED).await;
    let handle = tokio::spawn(run(engine.clone()));

    let mut refreshed = None;
    for _ in 0..100 {
      let snapshot = engine.store().read_snapshot().await.unwrap();
      if let Some(sel) = snapshot.complete() {
        refreshed = Some(sel);
        break;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.abort();

    let selection = refreshed.expect("background task wrote a selection");
    assert_eq!(
      selection.timestamps(),
      [Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap(); 3]
    );
  }
}
