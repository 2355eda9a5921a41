//! Aggregation over a filtered record subset.
//!
//! Everything here is a pure function of the records it is given. Period
//! buckets are keyed by the record `date` label and ordered lexicographically,
//! so producers must emit sortable labels.

mod funnel;
mod kpi;
mod series;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub use funnel::{FunnelStage, aggregate_funnel_stages};
pub use kpi::{Kpi, KpiId, KpiTargets, aggregate_kpis};
pub use series::{
  ChartSeries, SeriesPoint, aggregate_acquisition_series,
  aggregate_financial_series,
};

use crate::record::FactRecord;

// ─── Totals ──────────────────────────────────────────────────────────────────

/// Summed counters and amounts over some set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
  pub leads:        u64,
  pub qualified:    u64,
  pub appointments: u64,
  pub showed:       u64,
  pub conversions:  u64,
  pub revenue:      f64,
  pub cost:         f64,
}

impl Totals {
  /// Add one record. Counters saturate at `u64::MAX`.
  pub fn add(&mut self, r: &FactRecord) {
    self.leads = self.leads.saturating_add(r.leads);
    self.qualified = self.qualified.saturating_add(r.qualified);
    self.appointments = self.appointments.saturating_add(r.appointments);
    self.showed = self.showed.saturating_add(r.showed);
    self.conversions = self.conversions.saturating_add(r.conversions);
    self.revenue += r.revenue;
    self.cost += r.cost;
  }

  pub fn of<'r>(records: impl IntoIterator<Item = &'r FactRecord>) -> Self {
    let mut totals = Self::default();
    for r in records {
      totals.add(r);
    }
    totals
  }

  /// `(revenue - cost) / revenue` as a percentage; zero without revenue.
  pub fn margin(&self) -> f64 {
    if self.revenue > 0.0 {
      (self.revenue - self.cost) / self.revenue * 100.0
    } else {
      0.0
    }
  }

  /// `showed / appointments` as a percentage; zero without appointments.
  pub fn show_rate(&self) -> f64 {
    if self.appointments > 0 {
      self.showed as f64 / self.appointments as f64 * 100.0
    } else {
      0.0
    }
  }
}

/// Totals per `date` label, in ascending label order.
pub fn totals_by_date<'r>(records: &[&'r FactRecord]) -> BTreeMap<&'r str, Totals> {
  let mut buckets: BTreeMap<&str, Totals> = BTreeMap::new();
  for &r in records {
    buckets.entry(r.date.as_str()).or_default().add(r);
  }
  buckets
}

/// Number of distinct units present in `records`.
pub fn distinct_units(records: &[&FactRecord]) -> usize {
  records
    .iter()
    .map(|r| r.unit.as_str())
    .collect::<BTreeSet<_>>()
    .len()
}

// ─── Rounding and trend ──────────────────────────────────────────────────────

/// Round to the nearest integer, ties toward positive infinity.
pub fn round_half_up(x: f64) -> f64 {
  let r = x.round();
  // `f64::round` sends negative ties away from zero.
  if x - r == 0.5 { r + 1.0 } else { r }
}

/// Round to one decimal place.
pub fn round1(x: f64) -> f64 { round_half_up(x * 10.0) / 10.0 }

/// `part / whole` as a percentage with one decimal.
pub fn percent_of(part: f64, whole: f64) -> f64 {
  round_half_up(part / whole * 1000.0) / 10.0
}

/// Percentage change from `previous` to `current`, one decimal; zero when
/// there is no previous value to compare against.
pub fn variation(current: f64, previous: f64) -> f64 {
  if previous == 0.0 {
    return 0.0;
  }
  round_half_up((current - previous) / previous * 1000.0) / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
  Up,
  Down,
  Stable,
}

impl Trend {
  /// Classify a variation; anything within ±1 is noise.
  pub fn of(variation: f64) -> Self {
    if variation > 1.0 {
      Self::Up
    } else if variation < -1.0 {
      Self::Down
    } else {
      Self::Stable
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rounding_ties_go_up() {
    assert_eq!(round_half_up(2.5), 3.0);
    assert_eq!(round_half_up(-2.5), -2.0);
    assert_eq!(round_half_up(-2.6), -3.0);
    assert_eq!(round1(12.25), 12.3);
  }

  #[test]
  fn variation_rounds_to_one_decimal() {
    assert_eq!(variation(110.0, 100.0), 10.0);
    assert_eq!(variation(90.0, 120.0), -25.0);
    assert_eq!(variation(1.0, 3.0), -66.7);
    assert_eq!(variation(50.0, 0.0), 0.0);
  }

  #[test]
  fn trend_has_a_dead_zone() {
    assert_eq!(Trend::of(1.0), Trend::Stable);
    assert_eq!(Trend::of(-1.0), Trend::Stable);
    assert_eq!(Trend::of(1.1), Trend::Up);
    assert_eq!(Trend::of(-3.0), Trend::Down);
  }

  #[test]
  fn buckets_are_sorted_by_date() {
    let records = [
      FactRecord::new("2025-01-13", "A", "X").with_funnel([5, 0, 0, 0, 0]),
      FactRecord::new("2025-01-06", "A", "X").with_funnel([3, 0, 0, 0, 0]),
      FactRecord::new("2025-01-13", "B", "Y").with_funnel([2, 0, 0, 0, 0]),
    ];
    let refs: Vec<&FactRecord> = records.iter().collect();
    let buckets = totals_by_date(&refs);
    let keys: Vec<_> = buckets.keys().copied().collect();
    assert_eq!(keys, ["2025-01-06", "2025-01-13"]);
    assert_eq!(buckets["2025-01-13"].leads, 7);
    assert_eq!(distinct_units(&refs), 2);
  }

  #[test]
  fn counter_sums_saturate() {
    let huge = FactRecord::new("2025-01-06", "A", "X")
      .with_funnel([u64::MAX - 1, 0, 0, 0, 0]);
    let totals = Totals::of([&huge, &huge]);
    assert_eq!(totals.leads, u64::MAX);
  }

  #[test]
  fn ratios_guard_zero_denominators() {
    let empty = Totals::default();
    assert_eq!(empty.margin(), 0.0);
    assert_eq!(empty.show_rate(), 0.0);

    let t = Totals {
      appointments: 50,
      showed: 37,
      revenue: 1000.0,
      cost: 600.0,
      ..Totals::default()
    };
    assert_eq!(round1(t.margin()), 40.0);
    assert_eq!(round1(t.show_rate()), 74.0);
  }
}
