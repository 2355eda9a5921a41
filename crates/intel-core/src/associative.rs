//! Associative facet computation.
//!
//! Every value a dimension takes anywhere in the record collection is listed,
//! tagged with one of three states. A value is only ever `Excluded` when
//! picking it would leave nothing under the *other* dimensions' constraints;
//! its own dimension's selection never counts against it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
  dimension::{DimensionField, DimensionSet},
  filter::filter_records,
  record::FactRecord,
  selection::Selections,
};

/// How a facet value relates to the current selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueState {
  /// In this dimension's own selection.
  Selected,
  /// Reachable: selecting it would still match at least one record.
  Associated,
  /// Unreachable given the other dimensions' selections.
  Excluded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionValue {
  pub id:    String,
  pub label: String,
  pub state: ValueState,
}

/// One dimension's facet list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
  pub id:     String,
  pub label:  String,
  pub field:  DimensionField,
  /// Sorted by value.
  pub values: Vec<DimensionValue>,
}

impl Facet {
  pub fn value(&self, id: &str) -> Option<&DimensionValue> {
    self.values.iter().find(|v| v.id == id)
  }

  pub fn state_of(&self, id: &str) -> Option<ValueState> {
    self.value(id).map(|v| v.state)
  }
}

/// Compute the facet list of every dimension over the full, unfiltered
/// `records`.
pub fn compute_facets(
  records: &[FactRecord],
  selections: &Selections,
  dimensions: &DimensionSet,
) -> Vec<Facet> {
  let has_any_selection = selections.has_any();

  dimensions
    .iter()
    .map(|dim| {
      let all_values: BTreeSet<&str> =
        records.iter().map(|r| dim.value_of(r)).collect();

      // With nothing selected anywhere every value is reachable; skip the
      // filter pass entirely.
      let available: BTreeSet<&str> = if has_any_selection {
        filter_records(records, selections, dimensions, Some(dim.id.as_str()))
          .into_iter()
          .map(|r| dim.value_of(r))
          .collect()
      } else {
        BTreeSet::new()
      };

      let values = all_values
        .into_iter()
        .map(|value| {
          let state = if selections.is_selected(&dim.id, value) {
            ValueState::Selected
          } else if !has_any_selection || available.contains(value) {
            ValueState::Associated
          } else {
            ValueState::Excluded
          };
          DimensionValue {
            id: value.to_owned(),
            label: value.to_owned(),
            state,
          }
        })
        .collect();

      Facet {
        id: dim.id.clone(),
        label: dim.label.clone(),
        field: dim.field,
        values,
      }
    })
    .collect()
}
