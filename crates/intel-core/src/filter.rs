//! Record filtering under the facet-search policy: values selected within one
//! dimension are OR-ed, dimensions are AND-ed.

use std::collections::BTreeSet;

use crate::{
  dimension::{Dimension, DimensionSet},
  record::FactRecord,
  selection::Selections,
};

/// The records that satisfy every active selection.
///
/// A record passes when, for each dimension with a non-empty selection, its
/// value for that dimension is one of the selected values. `exclude` names a
/// dimension whose own selection is ignored; the associative computation uses
/// it to ask what a dimension could show given only the *other* constraints.
/// Selections on ids that are not in `dimensions` impose nothing.
pub fn filter_records<'r>(
  records: &'r [FactRecord],
  selections: &Selections,
  dimensions: &DimensionSet,
  exclude: Option<&str>,
) -> Vec<&'r FactRecord> {
  let constraints: Vec<(&Dimension, &BTreeSet<String>)> = selections
    .active()
    .filter(|(id, _)| Some(*id) != exclude)
    .filter_map(|(id, values)| dimensions.get(id).map(|dim| (dim, values)))
    .collect();

  records
    .iter()
    .filter(|record| {
      constraints
        .iter()
        .all(|(dim, values)| values.contains(dim.value_of(record)))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn records() -> Vec<FactRecord> {
    vec![
      FactRecord::new("2025-01-06", "A", "X"),
      FactRecord::new("2025-01-06", "A", "Y"),
      FactRecord::new("2025-01-06", "B", "X"),
      FactRecord::new("2025-01-13", "C", "Y"),
    ]
  }

  fn keys<'r>(filtered: &[&'r FactRecord]) -> Vec<(&'r str, &'r str)> {
    filtered
      .iter()
      .map(|r| (r.channel.as_str(), r.unit.as_str()))
      .collect()
  }

  #[test]
  fn no_selection_keeps_everything() {
    let records = records();
    let out = filter_records(
      &records,
      &Selections::default(),
      &DimensionSet::default(),
      None,
    );
    assert_eq!(out.len(), records.len());
  }

  #[test]
  fn values_within_a_dimension_are_or_ed() {
    let records = records();
    let sel = Selections::from_pairs([("channel", ["A", "C"])]);
    let out = filter_records(&records, &sel, &DimensionSet::default(), None);
    assert_eq!(keys(&out), vec![
      ("A", "X"),
      ("A", "Y"),
      ("C", "Y"),
    ]);
  }

  #[test]
  fn dimensions_are_and_ed() {
    let records = records();
    let sel = Selections::from_pairs([
      ("channel", vec!["A", "C"]),
      ("unit", vec!["Y"]),
    ]);
    let out = filter_records(&records, &sel, &DimensionSet::default(), None);
    assert_eq!(keys(&out), vec![
      ("A", "Y"),
      ("C", "Y"),
    ]);
  }

  #[test]
  fn excluded_dimension_is_ignored() {
    let records = records();
    let sel = Selections::from_pairs([("channel", ["B"]), ("unit", ["Y"])]);
    let dims = DimensionSet::default();

    assert!(filter_records(&records, &sel, &dims, None).is_empty());

    let others = filter_records(&records, &sel, &dims, Some("channel"));
    assert_eq!(keys(&others), vec![
      ("A", "Y"),
      ("C", "Y"),
    ]);
  }

  #[test]
  fn unknown_dimension_imposes_nothing() {
    let records = records();
    let sel = Selections::from_pairs([("region", ["north"])]);
    let out = filter_records(&records, &sel, &DimensionSet::default(), None);
    assert_eq!(out.len(), records.len());
  }
}
