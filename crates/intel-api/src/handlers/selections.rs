//! Handlers for `/selections` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/selections/toggle` | Body: `{"dimension":"unit","value":"SP Sul"}` |
//! | `DELETE` | `/selections/{dimension}` | 404 if the dimension is not configured |
//! | `DELETE` | `/selections` | Clears every dimension |
//!
//! Each answers with the recomputed snapshot.

use axum::{
  Json,
  extract::{Path, State},
};
use intel_core::source::RecordSource;
use serde::Deserialize;

use super::View;
use crate::{AppState, error::ApiError};

// ─── Toggle ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
  pub dimension: String,
  pub value:     String,
}

/// `POST /selections/toggle`
pub async fn toggle<R>(
  State(state): State<AppState<R>>,
  Json(body): Json<ToggleBody>,
) -> Result<View, ApiError>
where
  R: RecordSource + 'static,
{
  if body.value.is_empty() {
    return Err(ApiError::BadRequest("value must not be empty".into()));
  }
  let mut engine = state.engine.write().await;
  engine.toggle_value(&body.dimension, &body.value)?;
  Ok(View::of(&engine))
}

// ─── Clear ────────────────────────────────────────────────────────────────────

/// `DELETE /selections/{dimension}`
pub async fn clear_one<R>(
  State(state): State<AppState<R>>,
  Path(dimension): Path<String>,
) -> Result<View, ApiError>
where
  R: RecordSource + 'static,
{
  let mut engine = state.engine.write().await;
  if !engine.dimensions().contains(&dimension) {
    return Err(ApiError::NotFound(format!("dimension {dimension:?} not found")));
  }
  engine.clear_dimension(&dimension)?;
  Ok(View::of(&engine))
}

/// `DELETE /selections`
pub async fn clear_all<R>(
  State(state): State<AppState<R>>,
) -> Result<View, ApiError>
where
  R: RecordSource + 'static,
{
  let mut engine = state.engine.write().await;
  engine.clear_all()?;
  Ok(View::of(&engine))
}
