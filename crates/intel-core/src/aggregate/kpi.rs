//! Headline KPIs with period-over-period variation and sparklines.
//!
//! "Current" and "previous" are the last two date buckets. Sum KPIs compare
//! the raw bucket sums; ratio KPIs recompute each bucket's ratio from that
//! bucket's own numerator and denominator and report the difference in
//! percentage points.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{
  Totals, Trend, distinct_units, percent_of, round1, totals_by_date, variation,
};
use crate::{
  format::{ValueUnit, format_variation},
  record::FactRecord,
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumString,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum KpiId {
  Revenue,
  Margin,
  Leads,
  Appointments,
  ShowRate,
  Occupancy,
}

impl KpiId {
  pub fn label(&self) -> &'static str {
    match self {
      Self::Revenue => "Revenue",
      Self::Margin => "Margin",
      Self::Leads => "Leads",
      Self::Appointments => "Appointments",
      Self::ShowRate => "Show Rate",
      Self::Occupancy => "Occupancy",
    }
  }

  pub fn unit(&self) -> ValueUnit {
    match self {
      Self::Revenue => ValueUnit::Currency,
      Self::Leads | Self::Appointments => ValueUnit::Number,
      Self::Margin | Self::ShowRate | Self::Occupancy => ValueUnit::Percent,
    }
  }
}

/// Goal values shown next to each KPI. `None` means no goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiTargets {
  pub revenue:      Option<f64>,
  pub margin:       Option<f64>,
  pub leads:        Option<f64>,
  pub appointments: Option<f64>,
  pub show_rate:    Option<f64>,
  pub occupancy:    Option<f64>,
}

impl Default for KpiTargets {
  fn default() -> Self {
    Self {
      revenue:      Some(500_000.0),
      margin:       Some(35.0),
      leads:        Some(2_000.0),
      appointments: None,
      show_rate:    Some(80.0),
      occupancy:    Some(85.0),
    }
  }
}

impl KpiTargets {
  pub fn get(&self, id: KpiId) -> Option<f64> {
    match id {
      KpiId::Revenue => self.revenue,
      KpiId::Margin => self.margin,
      KpiId::Leads => self.leads,
      KpiId::Appointments => self.appointments,
      KpiId::ShowRate => self.show_rate,
      KpiId::Occupancy => self.occupancy,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
  pub id:                KpiId,
  pub label:             String,
  pub value:             f64,
  pub formatted_value:   String,
  pub previous_value:    f64,
  pub target:            Option<f64>,
  pub unit:              ValueUnit,
  pub trend:             Trend,
  pub variation_percent: f64,
  /// `variation_percent` as a signed percentage, e.g. `+12.3%`.
  pub formatted_variation: String,
  /// The same metric per date bucket, oldest first.
  pub sparkline:         Vec<f64>,
}

/// Period buckets plus the whole-range totals a KPI is computed from.
struct Periods<'a> {
  totals:  Totals,
  buckets: Vec<Totals>,
  current: Totals,
  prev:    Totals,
  targets: &'a KpiTargets,
}

impl Periods<'_> {
  /// A KPI whose value is a plain sum.
  ///
  /// `previous_value` is the total before the latest bucket was added.
  fn sum(&self, id: KpiId, metric: impl Fn(&Totals) -> f64) -> Kpi {
    let value = metric(&self.totals);
    let var = variation(metric(&self.current), metric(&self.prev));
    Kpi {
      id,
      label: id.label().to_owned(),
      value,
      formatted_value: id.unit().format(value),
      previous_value: value - metric(&self.current),
      target: self.targets.get(id),
      unit: id.unit(),
      trend: Trend::of(var),
      variation_percent: var,
      formatted_variation: format_variation(var),
      sparkline: self.buckets.iter().map(&metric).collect(),
    }
  }

  /// A KPI whose value is a percentage ratio. `overall` is the ratio over
  /// the whole range; `ratio` computes it for a single bucket, and `point`
  /// computes a bucket's sparkline value from the same raw totals.
  fn ratio(
    &self,
    id: KpiId,
    overall: f64,
    ratio: impl Fn(&Totals) -> f64,
    point: impl Fn(&Totals) -> f64,
  ) -> Kpi {
    let current = ratio(&self.current);
    let prev = ratio(&self.prev);
    let var = round1(current - prev);
    Kpi {
      id,
      label: id.label().to_owned(),
      value: round1(overall),
      formatted_value: id.unit().format(overall),
      previous_value: round1(prev),
      target: self.targets.get(id),
      unit: id.unit(),
      trend: Trend::of(var),
      variation_percent: var,
      formatted_variation: format_variation(var),
      sparkline: self.buckets.iter().map(point).collect(),
    }
  }
}

/// `part / whole` as a one-decimal percentage; zero without a denominator.
fn bucket_percent(part: f64, whole: f64) -> f64 {
  if whole > 0.0 { percent_of(part, whole) } else { 0.0 }
}

/// Derive the six headline KPIs from `records`.
///
/// An empty record set yields no KPIs at all, which is distinct from a set
/// whose sums are all zero.
///
/// Occupancy capacity counts the units and weeks present in `records`, so a
/// unit filtered out of view contributes no capacity.
pub fn aggregate_kpis(
  records: &[&FactRecord],
  capacity_per_unit_per_week: u64,
  targets: &KpiTargets,
) -> Vec<Kpi> {
  if records.is_empty() {
    return Vec::new();
  }

  let totals = Totals::of(records.iter().copied());
  let buckets: Vec<Totals> = totals_by_date(records).into_values().collect();
  let current = buckets.last().copied().unwrap_or(totals);
  let prev = match buckets.len() {
    0 | 1 => current,
    n => buckets[n - 2],
  };

  let weekly_capacity =
    (distinct_units(records) as u64 * capacity_per_unit_per_week) as f64;
  let total_capacity = weekly_capacity * buckets.len() as f64;
  let occupancy = |appointments: u64, capacity: f64| {
    if capacity > 0.0 {
      (appointments as f64 / capacity * 100.0).min(100.0)
    } else {
      0.0
    }
  };

  let periods = Periods {
    totals,
    buckets,
    current,
    prev,
    targets,
  };

  vec![
    periods.sum(KpiId::Revenue, |t| t.revenue),
    periods.ratio(KpiId::Margin, totals.margin(), Totals::margin, |t| {
      bucket_percent(t.revenue - t.cost, t.revenue)
    }),
    periods.sum(KpiId::Leads, |t| t.leads as f64),
    periods.sum(KpiId::Appointments, |t| t.appointments as f64),
    periods.ratio(KpiId::ShowRate, totals.show_rate(), Totals::show_rate, |t| {
      bucket_percent(t.showed as f64, t.appointments as f64)
    }),
    periods.ratio(
      KpiId::Occupancy,
      occupancy(totals.appointments, total_capacity),
      |t| occupancy(t.appointments, weekly_capacity),
      |t| bucket_percent(t.appointments as f64, weekly_capacity).min(100.0),
    ),
  ]
}
