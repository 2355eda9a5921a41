//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{
  aggregate::KpiTargets,
  dimension::{DimensionDefinition, default_definitions},
};

/// Tunables for the engine. Every field has a default, so an empty config
/// section is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Appointment slots one unit offers per week; the occupancy denominator.
  pub capacity_per_unit_per_week: u64,
  pub targets:                    KpiTargets,
  pub dimensions:                 Vec<DimensionDefinition>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      capacity_per_unit_per_week: 50,
      targets:                    KpiTargets::default(),
      dimensions:                 default_definitions(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_config_keeps_defaults() {
    let cfg: EngineConfig =
      serde_json::from_str(r#"{"capacity_per_unit_per_week": 40}"#).unwrap();
    assert_eq!(cfg.capacity_per_unit_per_week, 40);
    assert_eq!(cfg.targets, KpiTargets::default());
    assert_eq!(cfg.dimensions, default_definitions());
  }

  #[test]
  fn targets_can_be_cleared() {
    let cfg: EngineConfig =
      serde_json::from_str(r#"{"targets": {"revenue": null}}"#).unwrap();
    assert_eq!(cfg.targets.revenue, None);
    assert_eq!(cfg.targets.margin, Some(35.0));
  }
}
