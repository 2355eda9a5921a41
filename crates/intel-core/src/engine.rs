//! [`Engine`]: the state container the outer layers hold on to.
//!
//! The engine owns the resolved dimensions, the current [`EngineState`], and
//! the snapshot derived from it. Every transition goes through
//! [`Engine::dispatch`], which swaps in the next state and recomputes the
//! snapshot before returning, so a reader never sees a snapshot that lags the
//! state it was derived from.

use std::sync::Arc;

use tracing::debug;

use crate::{
  Error, Result,
  config::EngineConfig,
  derive::{DerivedSnapshot, derive},
  dimension::DimensionSet,
  record::{FactRecord, digest_records, parse_records},
  selection::{Action, EngineState},
};

#[derive(Debug, Clone)]
pub struct Engine {
  dimensions: DimensionSet,
  config:     EngineConfig,
  state:      EngineState,
  snapshot:   Arc<DerivedSnapshot>,
  /// Content digest of `state.records`, refreshed on every `SetData`.
  digest:     [u8; 32],
}

impl Engine {
  /// An engine with no records. Fails if the configured dimensions do not
  /// resolve.
  pub fn new(config: EngineConfig) -> Result<Self> {
    Self::with_records(config, Vec::new())
  }

  pub fn with_records(
    config: EngineConfig,
    records: Vec<FactRecord>,
  ) -> Result<Self> {
    let dimensions = DimensionSet::new(&config.dimensions)?;
    let state = EngineState::new(records);
    let snapshot = Arc::new(derive(&state, &dimensions, &config));
    let digest = digest_records(&state.records);
    Ok(Self {
      dimensions,
      config,
      state,
      snapshot,
      digest,
    })
  }

  /// Apply `action` and return the recomputed snapshot.
  ///
  /// Actions naming a dimension that is not configured are rejected and
  /// leave the engine untouched.
  pub fn dispatch(&mut self, action: Action) -> Result<Arc<DerivedSnapshot>> {
    if let Some(id) = action.dimension()
      && !self.dimensions.contains(id)
    {
      return Err(Error::UnknownDimension(id.to_owned()));
    }

    debug!(?action, version = self.state.version, "dispatching");
    let replaces_data = matches!(action, Action::SetData { .. });
    self.state = self.state.reduce(action);
    if replaces_data {
      self.digest = digest_records(&self.state.records);
    }
    self.snapshot = Arc::new(derive(&self.state, &self.dimensions, &self.config));
    debug!(
      version = self.state.version,
      filtered = self.snapshot.filtered_records.len(),
      active = self.snapshot.has_active_filters,
      "snapshot recomputed"
    );
    Ok(Arc::clone(&self.snapshot))
  }

  pub fn toggle_value(
    &mut self,
    dimension: &str,
    value: &str,
  ) -> Result<Arc<DerivedSnapshot>> {
    self.dispatch(Action::ToggleValue {
      dimension: dimension.to_owned(),
      value:     value.to_owned(),
    })
  }

  pub fn clear_dimension(
    &mut self,
    dimension: &str,
  ) -> Result<Arc<DerivedSnapshot>> {
    self.dispatch(Action::ClearDimension {
      dimension: dimension.to_owned(),
    })
  }

  pub fn clear_all(&mut self) -> Result<Arc<DerivedSnapshot>> {
    self.dispatch(Action::ClearAll)
  }

  /// Replace the records; selections are reset in the same step.
  pub fn set_data(
    &mut self,
    records: Vec<FactRecord>,
  ) -> Result<Arc<DerivedSnapshot>> {
    self.dispatch(Action::SetData { records })
  }

  /// Parse, validate, and load a JSON array of records. A malformed batch
  /// leaves the current records and selections in place.
  pub fn load_json(&mut self, json: &str) -> Result<Arc<DerivedSnapshot>> {
    let records = parse_records(json)?;
    self.set_data(records)
  }

  pub fn snapshot(&self) -> Arc<DerivedSnapshot> { Arc::clone(&self.snapshot) }

  pub fn state(&self) -> &EngineState { &self.state }

  pub fn version(&self) -> u64 { self.state.version }

  /// Digest of the loaded records. Unlike [`Engine::version`], it does not
  /// restart when the process does.
  pub fn records_digest(&self) -> &[u8; 32] { &self.digest }

  pub fn dimensions(&self) -> &DimensionSet { &self.dimensions }

  pub fn config(&self) -> &EngineConfig { &self.config }
}
