//! Read-only selectors over the current snapshot.
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `GET`  | `/snapshot` | the whole snapshot |
//! | `GET`  | `/dimensions` | facets plus `has_active_filters` |
//! | `GET`  | `/kpis` | KPI list |
//! | `GET`  | `/series` | `acquisition` and `financial` series |
//! | `GET`  | `/funnel` | funnel stages |
//! | `GET`  | `/records` | the filtered records |
//!
//! Every response carries the snapshot's `ETag` and honours `If-None-Match`.

use axum::{extract::State, http::HeaderMap, response::Response};
use intel_core::{
  aggregate::ChartSeries, associative::Facet, source::RecordSource,
};
use serde::Serialize;

use super::View;
use crate::AppState;

async fn current<R>(state: &AppState<R>) -> View {
  View::of(&*state.engine.read().await)
}

/// `GET /snapshot`
pub async fn full<R>(State(state): State<AppState<R>>, headers: HeaderMap) -> Response
where
  R: RecordSource + 'static,
{
  let view = current(&state).await;
  view.respond(&headers, &*view.snapshot)
}

#[derive(Serialize)]
struct DimensionsBody<'a> {
  dimensions:         &'a [Facet],
  has_active_filters: bool,
}

/// `GET /dimensions`
pub async fn dimensions<R>(
  State(state): State<AppState<R>>,
  headers: HeaderMap,
) -> Response
where
  R: RecordSource + 'static,
{
  let view = current(&state).await;
  view.respond(&headers, &DimensionsBody {
    dimensions:         &view.snapshot.dimensions,
    has_active_filters: view.snapshot.has_active_filters,
  })
}

/// `GET /kpis`
pub async fn kpis<R>(State(state): State<AppState<R>>, headers: HeaderMap) -> Response
where
  R: RecordSource + 'static,
{
  let view = current(&state).await;
  view.respond(&headers, &view.snapshot.kpis)
}

#[derive(Serialize)]
struct SeriesBody<'a> {
  acquisition: &'a [ChartSeries],
  financial:   &'a [ChartSeries],
}

/// `GET /series`
pub async fn series<R>(State(state): State<AppState<R>>, headers: HeaderMap) -> Response
where
  R: RecordSource + 'static,
{
  let view = current(&state).await;
  view.respond(&headers, &SeriesBody {
    acquisition: &view.snapshot.acquisition_series,
    financial:   &view.snapshot.financial_series,
  })
}

/// `GET /funnel`
pub async fn funnel<R>(State(state): State<AppState<R>>, headers: HeaderMap) -> Response
where
  R: RecordSource + 'static,
{
  let view = current(&state).await;
  view.respond(&headers, &view.snapshot.funnel_stages)
}

/// `GET /records`
pub async fn records<R>(
  State(state): State<AppState<R>>,
  headers: HeaderMap,
) -> Response
where
  R: RecordSource + 'static,
{
  let view = current(&state).await;
  view.respond(&headers, &view.snapshot.filtered_records)
}
