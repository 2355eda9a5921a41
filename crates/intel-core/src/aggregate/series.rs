//! Chart series: leads per channel over time, and revenue/cost over time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::FactRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
  pub date:  String,
  pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
  pub id:   String,
  pub name: String,
  /// Chronological.
  pub data: Vec<SeriesPoint>,
}

/// One leads series per channel present in `records`, ordered by channel
/// name. Channels with no records get no series.
pub fn aggregate_acquisition_series(records: &[&FactRecord]) -> Vec<ChartSeries> {
  let mut by_channel: BTreeMap<&str, BTreeMap<&str, u64>> = BTreeMap::new();
  for r in records {
    let leads = by_channel
      .entry(r.channel.as_str())
      .or_default()
      .entry(r.date.as_str())
      .or_default();
    *leads = leads.saturating_add(r.leads);
  }

  by_channel
    .into_iter()
    .map(|(channel, by_date)| ChartSeries {
      id:   series_id(channel),
      name: channel.to_owned(),
      data: by_date
        .into_iter()
        .map(|(date, leads)| SeriesPoint {
          date:  date.to_owned(),
          value: leads as f64,
        })
        .collect(),
    })
    .collect()
}

/// The `revenue` and `cost` series, summed per date across all of
/// `records`.
pub fn aggregate_financial_series(records: &[&FactRecord]) -> Vec<ChartSeries> {
  let mut by_date: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
  for r in records {
    let (revenue, cost) = by_date.entry(r.date.as_str()).or_default();
    *revenue += r.revenue;
    *cost += r.cost;
  }

  let series = |id: &str, name: &str, pick: fn(&(f64, f64)) -> f64| {
    ChartSeries {
      id:   id.to_owned(),
      name: name.to_owned(),
      data: by_date
        .iter()
        .map(|(date, sums)| SeriesPoint {
          date:  (*date).to_owned(),
          value: pick(sums),
        })
        .collect(),
    }
  };

  vec![
    series("revenue", "Revenue", |s| s.0),
    series("cost", "Cost", |s| s.1),
  ]
}

/// Lowercase, with each whitespace run replaced by `-`.
fn series_id(name: &str) -> String {
  name
    .split_whitespace()
    .map(str::to_lowercase)
    .collect::<Vec<_>>()
    .join("-")
}
