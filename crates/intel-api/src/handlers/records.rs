//! Handlers that replace the record collection.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/records` | Body: JSON array of records; 400 names the bad row |
//! | `POST` | `/records/reload` | Re-reads the configured source; 409 if superseded |
//! | `GET`  | `/freshness` | Source and time of the last applied load |

use axum::{Json, extract::State};
use intel_core::source::RecordSource;

use super::View;
use crate::{
  AppState,
  error::ApiError,
  loader::{self, Freshness},
};

/// `PUT /records`
pub async fn replace<R>(
  State(state): State<AppState<R>>,
  body: String,
) -> Result<View, ApiError>
where
  R: RecordSource + 'static,
{
  loader::replace(&state, &body).await
}

/// `POST /records/reload`
pub async fn reload<R>(State(state): State<AppState<R>>) -> Result<View, ApiError>
where
  R: RecordSource + 'static,
{
  loader::reload(&state).await
}

/// `GET /freshness`
pub async fn freshness<R>(State(state): State<AppState<R>>) -> Json<Freshness>
where
  R: RecordSource + 'static,
{
  Json(state.loads.freshness().await)
}
