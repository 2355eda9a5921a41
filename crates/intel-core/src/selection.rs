//! Selection state and the transitions that change it.
//!
//! State is never edited in place. Every [`Action`] applied through
//! [`EngineState::reduce`] yields a new state with a bumped version, leaving
//! the previous value untouched so observers can detect change by version.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::record::FactRecord;

// ─── Selections ──────────────────────────────────────────────────────────────

/// Per-dimension sets of selected facet values.
///
/// An absent dimension and a dimension with an empty set both mean "no
/// constraint". Empty sets are never stored, so two selection states that
/// constrain the same values always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
  from = "BTreeMap<String, BTreeSet<String>>",
  into = "BTreeMap<String, BTreeSet<String>>"
)]
pub struct Selections {
  by_dimension: BTreeMap<String, BTreeSet<String>>,
}

impl From<BTreeMap<String, BTreeSet<String>>> for Selections {
  fn from(mut by_dimension: BTreeMap<String, BTreeSet<String>>) -> Self {
    by_dimension.retain(|_, values| !values.is_empty());
    Self { by_dimension }
  }
}

impl From<Selections> for BTreeMap<String, BTreeSet<String>> {
  fn from(s: Selections) -> Self { s.by_dimension }
}

impl Selections {
  /// The selected values for `dimension`, if it has any.
  pub fn get(&self, dimension: &str) -> Option<&BTreeSet<String>> {
    self.by_dimension.get(dimension)
  }

  pub fn is_selected(&self, dimension: &str, value: &str) -> bool {
    self
      .get(dimension)
      .is_some_and(|values| values.contains(value))
  }

  /// Dimensions that currently constrain the result, with their values.
  pub fn active(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
    self
      .by_dimension
      .iter()
      .map(|(dim, values)| (dim.as_str(), values))
  }

  /// Whether any dimension anywhere has a selection.
  pub fn has_any(&self) -> bool { !self.by_dimension.is_empty() }

  /// A copy with `value` added to or removed from `dimension`.
  pub fn toggled(&self, dimension: &str, value: &str) -> Self {
    let mut next = self.clone();
    let values = next.by_dimension.entry(dimension.to_owned()).or_default();
    if !values.remove(value) {
      values.insert(value.to_owned());
    }
    if values.is_empty() {
      next.by_dimension.remove(dimension);
    }
    next
  }

  /// A copy with `dimension` unconstrained.
  pub fn cleared(&self, dimension: &str) -> Self {
    let mut next = self.clone();
    next.by_dimension.remove(dimension);
    next
  }

  /// Build a selection state from `(dimension, values)` pairs.
  pub fn from_pairs<D, I, V>(pairs: impl IntoIterator<Item = (D, I)>) -> Self
  where
    D: Into<String>,
    I: IntoIterator<Item = V>,
    V: Into<String>,
  {
    pairs
      .into_iter()
      .map(|(dim, values)| {
        (dim.into(), values.into_iter().map(Into::into).collect())
      })
      .collect::<BTreeMap<String, BTreeSet<String>>>()
      .into()
  }
}

// ─── Actions ─────────────────────────────────────────────────────────────────

/// The four transitions of the selection state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
  /// Flip membership of `value` in `dimension`'s selection.
  ToggleValue { dimension: String, value: String },
  /// Remove every selected value of `dimension`.
  ClearDimension { dimension: String },
  /// Remove every selection.
  ClearAll,
  /// Replace the record collection and reset all selections. Records read
  /// from the wire are validated as they deserialize.
  SetData { records: Vec<FactRecord> },
}

impl Action {
  /// The dimension id the action refers to, if any.
  pub fn dimension(&self) -> Option<&str> {
    match self {
      Self::ToggleValue { dimension, .. } | Self::ClearDimension { dimension } => {
        Some(dimension.as_str())
      }
      Self::ClearAll | Self::SetData { .. } => None,
    }
  }
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Records plus selections: everything a snapshot is derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineState {
  pub records:    Arc<[FactRecord]>,
  pub selections: Selections,
  /// Incremented on every transition.
  pub version:    u64,
}

impl EngineState {
  pub fn new(records: Vec<FactRecord>) -> Self {
    Self {
      records:    records.into(),
      selections: Selections::default(),
      version:    0,
    }
  }

  /// Apply `action`, producing the next state.
  ///
  /// `SetData` swaps the records and drops the selections in one step, so no
  /// state ever pairs new records with selections made against old ones.
  pub fn reduce(&self, action: Action) -> Self {
    let version = self.version + 1;
    match action {
      Action::ToggleValue { dimension, value } => Self {
        records: Arc::clone(&self.records),
        selections: self.selections.toggled(&dimension, &value),
        version,
      },
      Action::ClearDimension { dimension } => Self {
        records: Arc::clone(&self.records),
        selections: self.selections.cleared(&dimension),
        version,
      },
      Action::ClearAll => Self {
        records: Arc::clone(&self.records),
        selections: Selections::default(),
        version,
      },
      Action::SetData { records } => Self {
        records: records.into(),
        selections: Selections::default(),
        version,
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn toggle(dimension: &str, value: &str) -> Action {
    Action::ToggleValue {
      dimension: dimension.into(),
      value:     value.into(),
    }
  }

  #[test]
  fn toggle_twice_restores_the_previous_set() {
    let start = EngineState::new(vec![]).reduce(toggle("unit", "X"));
    let twice = start
      .reduce(toggle("unit", "Y"))
      .reduce(toggle("unit", "Y"));
    assert_eq!(twice.selections, start.selections);
  }

  #[test]
  fn toggle_does_not_touch_the_previous_state() {
    let before = EngineState::new(vec![]);
    let after = before.reduce(toggle("channel", "A"));
    assert!(!before.selections.has_any());
    assert!(after.selections.is_selected("channel", "A"));
    assert_eq!(after.version, before.version + 1);
  }

  #[test]
  fn clear_dimension_leaves_others_alone() {
    let state = EngineState::new(vec![])
      .reduce(toggle("channel", "A"))
      .reduce(toggle("unit", "X"))
      .reduce(Action::ClearDimension {
        dimension: "channel".into(),
      });
    assert!(state.selections.get("channel").is_none());
    assert!(state.selections.is_selected("unit", "X"));
  }

  #[test]
  fn clear_all_empties_everything() {
    let state = EngineState::new(vec![])
      .reduce(toggle("channel", "A"))
      .reduce(toggle("unit", "X"))
      .reduce(Action::ClearAll);
    assert!(!state.selections.has_any());
  }

  #[test]
  fn set_data_resets_selections_with_the_records() {
    let records = vec![FactRecord::new("2025-01-06", "B", "Y")];
    let state = EngineState::new(vec![FactRecord::new("2025-01-06", "A", "X")])
      .reduce(toggle("channel", "A"))
      .reduce(Action::SetData {
        records: records.clone(),
      });
    assert_eq!(&*state.records, records.as_slice());
    assert!(!state.selections.has_any());
  }

  #[test]
  fn empty_and_absent_selections_are_equal() {
    let emptied = Selections::default()
      .toggled("unit", "X")
      .toggled("unit", "X");
    assert_eq!(emptied, Selections::default());

    let from_json: Selections =
      serde_json::from_str(r#"{"unit": [], "channel": []}"#).unwrap();
    assert_eq!(from_json, Selections::default());
    assert!(!from_json.has_any());
  }

  #[test]
  fn action_wire_shape() {
    let action: Action = serde_json::from_str(
      r#"{"type": "toggle_value", "dimension": "unit", "value": "X"}"#,
    )
    .unwrap();
    assert_eq!(action, toggle("unit", "X"));
    assert_eq!(action.dimension(), Some("unit"));
  }

  #[test]
  fn set_data_from_the_wire_validates_its_records() {
    let negative = r#"{"type": "set_data", "records": [{"date": "d",
      "channel": "c", "unit": "u", "leads": 1, "qualified": 1,
      "appointments": 1, "showed": 1, "conversions": 1,
      "revenue": -10, "cost": 1}]}"#;
    assert!(serde_json::from_str::<Action>(negative).is_err());

    let valid = negative.replace("-10", "10");
    let action: Action = serde_json::from_str(&valid).unwrap();
    assert!(matches!(action, Action::SetData { records } if records[0].revenue == 10.0));
  }
}
