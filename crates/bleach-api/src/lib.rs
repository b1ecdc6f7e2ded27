//! JSON HTTP API serving the daily selection.
//!
//! Exposes an axum [`Router`] backed by a [`RefreshEngine`] over any
//! [`SelectionStore`]. Binding and process setup are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = bleach_api::api_router(Arc::new(RefreshEngine::new(store)));
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod selection;

use std::sync::Arc;

use axum::{Router, routing::get};
use bleach_core::{clock::Clock, refresh::RefreshEngine, store::SelectionStore};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Build the API router for `engine`.
pub fn api_router<S, C>(engine: Arc<RefreshEngine<S, C>>) -> Router<()>
where
  S: SelectionStore + 'static,
  C: Clock + 'static,
{
  Router::new()
    .route("/", get(selection::root::<S, C>))
    .route("/{kind}", get(selection::by_kind::<S, C>))
    .fallback(selection::not_found)
    .layer(TraceLayer::new_for_http())
    .with_state(engine)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use bleach_core::{clock::FixedClock, store::SelectionStore as _};
  use bleach_store_sqlite::SqliteStore;
  use chrono::{TimeZone as _, Utc};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  const SEED: &str = "
    INSERT INTO bleach_characters (id, name, race, affiliation, description) VALUES
      (1, 'Kenpachi Zaraki', 'Soul Reaper', 'Gotei 13', 'Captain of the 11th Division');
    INSERT INTO bleach_bankai (id, chr_id, bankai) VALUES (1, 1, 'Nozarashi');
    INSERT INTO bleach_schrift (id, chr_id, schrift) VALUES (1, 1, 'A - The Antithesis');
  ";

  type Engine = Arc<RefreshEngine<SqliteStore, FixedClock>>;

  async fn engine(seed: &str) -> Engine {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.seed(seed).await.unwrap();
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
    Arc::new(RefreshEngine::with_clock(store, clock))
  }

  async fn get(engine: &Engine, uri: &str) -> Response {
    let req = Request::builder()
      .method("GET")
      .uri(uri)
      .body(Body::empty())
      .unwrap();
    api_router(engine.clone()).oneshot(req).await.unwrap()
  }

  async fn body_bytes(resp: Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap()
      .to_vec()
  }

  async fn body_json(resp: Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
  }

  // ── Routing ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn root_and_character_are_identical() {
    let engine = engine(SEED).await;

    let root = get(&engine, "/").await;
    assert_eq!(root.status(), StatusCode::OK);
    let root = body_json(root).await;

    let character = body_json(get(&engine, "/character").await).await;
    assert_eq!(root, character);
    assert_eq!(character, json!({
      "id":          1,
      "name":        "Kenpachi Zaraki",
      "race":        "Soul Reaper",
      "affiliation": "Gotei 13",
      "description": "Captain of the 11th Division",
    }));
  }

  #[tokio::test]
  async fn bankai_and_schrift_have_fixed_shapes() {
    let engine = engine(SEED).await;

    let bankai = body_json(get(&engine, "/bankai").await).await;
    assert_eq!(bankai, json!({ "bankai": "Nozarashi", "chr_id": 1 }));

    let schrift = body_json(get(&engine, "/schrift").await).await;
    assert_eq!(schrift, json!({ "schrift": "A - The Antithesis", "chr_id": 1 }));
  }

  #[tokio::test]
  async fn path_segment_is_case_insensitive() {
    let engine = engine(SEED).await;
    let resp = get(&engine, "/BanKai").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["bankai"], "Nozarashi");
  }

  #[tokio::test]
  async fn unknown_segment_returns_404_without_data() {
    let engine = engine("").await;
    let resp = get(&engine, "/unknown").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_json(resp).await["error"].is_string());

    // The store was never touched.
    let snapshot = engine.store().read_snapshot().await.unwrap();
    assert_eq!(snapshot.timestamps(), [None, None, None]);
  }

  #[tokio::test]
  async fn responses_are_json() {
    let engine = engine(SEED).await;
    for uri in ["/", "/schrift", "/nope", "/character/", "/unknown/x"] {
      let resp = get(&engine, uri).await;
      let ct = resp.headers().get(header::CONTENT_TYPE).unwrap();
      assert_eq!(ct, "application/json", "{uri}");
    }
  }

  #[tokio::test]
  async fn unmatched_paths_return_json_404() {
    let engine = engine(SEED).await;
    for uri in ["/character/", "/unknown/x", "/bankai/1/extra"] {
      let resp = get(&engine, uri).await;
      assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
      let ct = resp.headers().get(header::CONTENT_TYPE).unwrap();
      assert_eq!(ct, "application/json", "{uri}");
      assert!(body_json(resp).await["error"].is_string(), "{uri}");
    }

    let snapshot = engine.store().read_snapshot().await.unwrap();
    assert_eq!(snapshot.timestamps(), [None, None, None]);
  }

  // ── Freshness ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn repeated_requests_are_byte_identical() {
    let engine = engine(SEED).await;
    engine
      .store()
      .seed("INSERT INTO bleach_characters (id, name) VALUES (2, 'Yachiru Kusajishi');")
      .await
      .unwrap();

    let first = body_bytes(get(&engine, "/character").await).await;
    for _ in 0..10 {
      assert_eq!(body_bytes(get(&engine, "/character").await).await, first);
    }
  }

  #[tokio::test]
  async fn first_request_populates_every_kind() {
    let engine = engine(SEED).await;
    assert_eq!(get(&engine, "/").await.status(), StatusCode::OK);

    let selection = engine.store().read_snapshot().await.unwrap().complete();
    let selection = selection.expect("all kinds written");
    let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    assert_eq!(selection.timestamps(), [stamp; 3]);
  }

  // ── Errors ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn empty_bankai_catalog_returns_500_and_writes_nothing() {
    let engine = engine(
      "INSERT INTO bleach_characters (id, name) VALUES (1, 'Uryu Ishida');
       INSERT INTO bleach_schrift (id, chr_id, schrift) VALUES (1, 1, 'A - The Antithesis');",
    )
    .await;

    for uri in ["/", "/bankai", "/schrift"] {
      let resp = get(&engine, uri).await;
      assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
      let body = body_json(resp).await;
      assert_eq!(body["error"], "no data available for bankai");
    }

    let snapshot = engine.store().read_snapshot().await.unwrap();
    assert_eq!(snapshot.timestamps(), [None, None, None]);
  }
}
