//! Handlers for the selection endpoints.
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `GET`  | `/` | same as `/character` |
//! | `GET`  | `/character` | every column of the selected character |
//! | `GET`  | `/bankai` | `{"bankai": ..., "chr_id": ...}` |
//! | `GET`  | `/schrift` | `{"schrift": ..., "chr_id": ...}` |
//!
//! The path segment is matched case-insensitively. Every other path answers
//! 404 with a JSON error body. Each request checks
//! staleness and refreshes the whole group first if needed.

use std::{str::FromStr as _, sync::Arc};

use axum::{
  Json,
  extract::{Path, State},
  http::Uri,
};
use bleach_core::{
  clock::Clock,
  entity::{Character, EntityKind, Selection},
  refresh::RefreshEngine,
  store::SelectionStore,
};
use serde::Serialize;

use crate::error::ApiError;

// ─── Response bodies ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BankaiBody {
  pub bankai: String,
  pub chr_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SchriftBody {
  pub schrift: String,
  pub chr_id:  i64,
}

/// The projection of one kind out of the current selection.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SelectionBody {
  Character(Character),
  Bankai(BankaiBody),
  Schrift(SchriftBody),
}

impl SelectionBody {
  pub fn project(selection: Selection, kind: EntityKind) -> Self {
    match kind {
      EntityKind::Character => {
        SelectionBody::Character(selection.character.entity)
      }
      EntityKind::Bankai => SelectionBody::Bankai(BankaiBody {
        bankai: selection.bankai.entity.bankai,
        chr_id: selection.bankai.entity.chr_id,
      }),
      EntityKind::Schrift => SelectionBody::Schrift(SchriftBody {
        schrift: selection.schrift.entity.schrift,
        chr_id:  selection.schrift.entity.chr_id,
      }),
    }
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /`
pub async fn root<S, C>(
  State(engine): State<Arc<RefreshEngine<S, C>>>,
) -> Result<Json<SelectionBody>, ApiError>
where
  S: SelectionStore,
  C: Clock,
{
  respond(&*engine, EntityKind::Character).await
}

/// `GET /{kind}`
pub async fn by_kind<S, C>(
  State(engine): State<Arc<RefreshEngine<S, C>>>,
  Path(segment): Path<String>,
) -> Result<Json<SelectionBody>, ApiError>
where
  S: SelectionStore,
  C: Clock,
{
  let kind = EntityKind::from_str(&segment).map_err(|_| {
    ApiError::NotFound(format!("no selection named {segment:?}"))
  })?;
  respond(&*engine, kind).await
}

/// Any path the routes above do not match, e.g. `/character/`.
pub async fn not_found(uri: Uri) -> ApiError {
  ApiError::NotFound(format!("no route for {:?}", uri.path()))
}

async fn respond<S, C>(
  engine: &RefreshEngine<S, C>,
  kind: EntityKind,
) -> Result<Json<SelectionBody>, ApiError>
where
  S: SelectionStore,
  C: Clock,
{
  let selection = engine.current().await?;
  Ok(Json(SelectionBody::project(selection, kind)))
}
