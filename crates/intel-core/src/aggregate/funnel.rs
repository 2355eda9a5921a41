//! The five-stage conversion funnel.

use serde::{Deserialize, Serialize};

use super::{Totals, percent_of};
use crate::record::FactRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStage {
  pub id:      String,
  pub label:   String,
  pub value:   u64,
  /// Share of leads, one decimal; the leads stage is 100.
  pub percent: f64,
}

/// Funnel stages from the totals of `records`. Without leads there is no
/// baseline, so no stages are returned.
pub fn aggregate_funnel_stages(records: &[&FactRecord]) -> Vec<FunnelStage> {
  let totals = Totals::of(records.iter().copied());
  if totals.leads == 0 {
    return Vec::new();
  }

  let leads = totals.leads as f64;
  let stage = |id: &str, label: &str, value: u64| FunnelStage {
    id: id.to_owned(),
    label: label.to_owned(),
    value,
    percent: percent_of(value as f64, leads),
  };

  vec![
    FunnelStage {
      percent: 100.0,
      ..stage("leads", "Leads", totals.leads)
    },
    stage("qualified", "Qualified", totals.qualified),
    stage("scheduled", "Scheduled", totals.appointments),
    stage("showed", "Showed", totals.showed),
    stage("converted", "Converted", totals.conversions),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn percents_are_relative_to_leads() {
    let records = [
      FactRecord::new("2025-01-06", "A", "X").with_funnel([60, 40, 30, 22, 12]),
      FactRecord::new("2025-01-13", "B", "Y").with_funnel([40, 30, 20, 15, 10]),
    ];
    let refs: Vec<_> = records.iter().collect();
    let stages = aggregate_funnel_stages(&refs);

    let percents: Vec<f64> = stages.iter().map(|s| s.percent).collect();
    assert_eq!(percents, [100.0, 70.0, 50.0, 37.0, 22.0]);
    let values: Vec<u64> = stages.iter().map(|s| s.value).collect();
    assert_eq!(values, [100, 70, 50, 37, 22]);
    assert_eq!(stages[2].id, "scheduled");
  }

  #[test]
  fn uneven_ratios_round_to_one_decimal() {
    let records =
      [FactRecord::new("2025-01-06", "A", "X").with_funnel([3, 2, 1, 1, 0])];
    let refs: Vec<_> = records.iter().collect();
    let percents: Vec<f64> = aggregate_funnel_stages(&refs)
      .iter()
      .map(|s| s.percent)
      .collect();
    assert_eq!(percents, [100.0, 66.7, 33.3, 33.3, 0.0]);
  }

  #[test]
  fn zero_leads_means_no_funnel() {
    let records =
      [FactRecord::new("2025-01-06", "A", "X").with_money(100.0, 10.0)];
    let refs: Vec<_> = records.iter().collect();
    assert!(aggregate_funnel_stages(&refs).is_empty());
    assert!(aggregate_funnel_stages(&[]).is_empty());
  }
}
