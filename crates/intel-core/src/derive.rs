//! The derivation orchestrator: one pure pass from state to snapshot.

use serde::{Deserialize, Serialize};

use crate::{
  aggregate::{
    ChartSeries, FunnelStage, Kpi, aggregate_acquisition_series,
    aggregate_financial_series, aggregate_funnel_stages, aggregate_kpis,
  },
  associative::{Facet, compute_facets},
  config::EngineConfig,
  dimension::DimensionSet,
  filter::filter_records,
  record::FactRecord,
  selection::EngineState,
};

/// Everything the presentation layer reads, derived from a single
/// (records, selections) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedSnapshot {
  pub filtered_records:   Vec<FactRecord>,
  pub dimensions:         Vec<Facet>,
  pub kpis:               Vec<Kpi>,
  pub acquisition_series: Vec<ChartSeries>,
  pub financial_series:   Vec<ChartSeries>,
  pub funnel_stages:      Vec<FunnelStage>,
  pub has_active_filters: bool,
}

/// Recompute the whole snapshot.
///
/// Filtering happens once and every aggregate reads that same subset, so all
/// fields of the result describe the same filter state. Same inputs, same
/// output.
pub fn derive(
  state: &EngineState,
  dimensions: &DimensionSet,
  config: &EngineConfig,
) -> DerivedSnapshot {
  let has_active_filters = state.selections.has_any();
  let filtered = filter_records(&state.records, &state.selections, dimensions, None);

  DerivedSnapshot {
    dimensions: compute_facets(&state.records, &state.selections, dimensions),
    kpis: aggregate_kpis(
      &filtered,
      config.capacity_per_unit_per_week,
      &config.targets,
    ),
    acquisition_series: aggregate_acquisition_series(&filtered),
    financial_series: aggregate_financial_series(&filtered),
    funnel_stages: aggregate_funnel_stages(&filtered),
    filtered_records: filtered.into_iter().cloned().collect(),
    has_active_filters,
  }
}
