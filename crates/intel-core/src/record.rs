//! Fact records: the flat rows the engine filters and aggregates.
//!
//! One record exists per (date, channel, unit) combination. Records are
//! produced by an external collaborator, validated once at ingestion, and never
//! mutated afterwards; a new snapshot replaces the whole collection.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum::EnumString;

use crate::{Error, Result};

// ─── FactRecord ──────────────────────────────────────────────────────────────

/// A validated fact row.
///
/// The funnel counters are expected to narrow stage by stage
/// (`leads >= qualified >= appointments >= showed >= conversions`). That is a
/// producer contract; the engine does not check it.
///
/// Deserializing a `FactRecord` goes through [`RawRecord::validate`], so a
/// row that would be rejected at ingestion is rejected here too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct FactRecord {
  /// Period label. Must sort lexicographically in chronological order
  /// (e.g. zero-padded ISO dates).
  pub date:         String,
  pub channel:      String,
  pub unit:         String,
  pub leads:        u64,
  pub qualified:    u64,
  pub appointments: u64,
  pub showed:       u64,
  pub conversions:  u64,
  pub revenue:      f64,
  pub cost:         f64,
}

impl FactRecord {
  /// Convenience constructor with every counter and amount set to zero.
  pub fn new(
    date: impl Into<String>,
    channel: impl Into<String>,
    unit: impl Into<String>,
  ) -> Self {
    Self {
      date:         date.into(),
      channel:      channel.into(),
      unit:         unit.into(),
      leads:        0,
      qualified:    0,
      appointments: 0,
      showed:       0,
      conversions:  0,
      revenue:      0.0,
      cost:         0.0,
    }
  }

  /// Set the five funnel counters, top of funnel first.
  pub fn with_funnel(mut self, counters: [u64; 5]) -> Self {
    let [leads, qualified, appointments, showed, conversions] = counters;
    self.leads = leads;
    self.qualified = qualified;
    self.appointments = appointments;
    self.showed = showed;
    self.conversions = conversions;
    self
  }

  pub fn with_money(mut self, revenue: f64, cost: f64) -> Self {
    self.revenue = revenue;
    self.cost = cost;
    self
  }
}

// ─── Measures ────────────────────────────────────────────────────────────────

/// The numeric fields of a [`FactRecord`]. They can be summed but never
/// faceted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Measure {
  Leads,
  Qualified,
  Appointments,
  Showed,
  Conversions,
  Revenue,
  Cost,
}

// ─── Ingestion ───────────────────────────────────────────────────────────────

/// Largest counter accepted at ingestion. Producers emit JSON numbers, which
/// stop representing every integer above this.
pub const MAX_COUNTER: f64 = 9_007_199_254_740_991.0;

/// A record as delivered by the producer, before validation. Every field is
/// optional here so that a missing value is reported by name and position
/// instead of being coerced to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
  pub date:         Option<String>,
  pub channel:      Option<String>,
  pub unit:         Option<String>,
  pub leads:        Option<f64>,
  pub qualified:    Option<f64>,
  pub appointments: Option<f64>,
  pub showed:       Option<f64>,
  pub conversions:  Option<f64>,
  pub revenue:      Option<f64>,
  pub cost:         Option<f64>,
}

impl RawRecord {
  /// Validate this row, `index` being its position in the batch.
  pub fn validate(self, index: usize) -> Result<FactRecord> {
    Ok(FactRecord {
      date:         label(self.date, index, "date")?,
      channel:      label(self.channel, index, "channel")?,
      unit:         label(self.unit, index, "unit")?,
      leads:        counter(self.leads, index, "leads")?,
      qualified:    counter(self.qualified, index, "qualified")?,
      appointments: counter(self.appointments, index, "appointments")?,
      showed:       counter(self.showed, index, "showed")?,
      conversions:  counter(self.conversions, index, "conversions")?,
      revenue:      amount(self.revenue, index, "revenue")?,
      cost:         amount(self.cost, index, "cost")?,
    })
  }
}

impl TryFrom<RawRecord> for FactRecord {
  type Error = Error;

  fn try_from(raw: RawRecord) -> Result<Self> { raw.validate(0) }
}

impl From<&FactRecord> for RawRecord {
  fn from(r: &FactRecord) -> Self {
    Self {
      date:         Some(r.date.clone()),
      channel:      Some(r.channel.clone()),
      unit:         Some(r.unit.clone()),
      leads:        Some(r.leads as f64),
      qualified:    Some(r.qualified as f64),
      appointments: Some(r.appointments as f64),
      showed:       Some(r.showed as f64),
      conversions:  Some(r.conversions as f64),
      revenue:      Some(r.revenue),
      cost:         Some(r.cost),
    }
  }
}

/// Validate a whole batch. The first malformed row rejects the batch.
pub fn validate_records(raw: Vec<RawRecord>) -> Result<Vec<FactRecord>> {
  raw
    .into_iter()
    .enumerate()
    .map(|(index, r)| r.validate(index))
    .collect()
}

/// Parse and validate a JSON array of records.
pub fn parse_records(json: &str) -> Result<Vec<FactRecord>> {
  let raw: Vec<RawRecord> = serde_json::from_str(json)?;
  validate_records(raw)
}

/// SHA-256 over every field of every record, in order. Equal collections
/// always share a digest, so it identifies the data across restarts.
pub fn digest_records(records: &[FactRecord]) -> [u8; 32] {
  let mut hasher = Sha256::new();
  hasher.update((records.len() as u64).to_le_bytes());
  for r in records {
    for label in [&r.date, &r.channel, &r.unit] {
      hasher.update(label.as_bytes());
      hasher.update([0]);
    }
    for counter in [r.leads, r.qualified, r.appointments, r.showed, r.conversions] {
      hasher.update(counter.to_le_bytes());
    }
    hasher.update(r.revenue.to_bits().to_le_bytes());
    hasher.update(r.cost.to_bits().to_le_bytes());
  }
  let mut digest = [0; 32];
  digest.copy_from_slice(&hasher.finalize());
  digest
}

fn label(
  value: Option<String>,
  index: usize,
  field: &'static str,
) -> Result<String> {
  value.ok_or(Error::MalformedRecord {
    index,
    field,
    reason: "is missing",
  })
}

fn counter(
  value: Option<f64>,
  index: usize,
  field: &'static str,
) -> Result<u64> {
  let v = amount(value, index, field)?;
  if v.fract() != 0.0 {
    return Err(Error::MalformedRecord {
      index,
      field,
      reason: "is not a whole number",
    });
  }
  if v > MAX_COUNTER {
    return Err(Error::MalformedRecord {
      index,
      field,
      reason: "is too large",
    });
  }
  Ok(v as u64)
}

fn amount(
  value: Option<f64>,
  index: usize,
  field: &'static str,
) -> Result<f64> {
  let malformed = |reason| Error::MalformedRecord {
    index,
    field,
    reason,
  };
  match value {
    None => Err(malformed("is missing")),
    Some(v) if !v.is_finite() => Err(malformed("is not a finite number")),
    Some(v) if v < 0.0 => Err(malformed("is negative")),
    Some(v) => Ok(v),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ROW: &str = r#"{
    "date": "2025-01-06", "channel": "Google Ads", "unit": "SP Centro",
    "leads": 42, "qualified": 29, "appointments": 21, "showed": 15,
    "conversions": 9, "revenue": 3420, "cost": 2052
  }"#;

  #[test]
  fn parses_a_complete_row() {
    let records = parse_records(&format!("[{ROW}]")).unwrap();
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.channel, "Google Ads");
    assert_eq!(r.leads, 42);
    assert_eq!(r.conversions, 9);
    assert_eq!(r.revenue, 3420.0);
  }

  #[test]
  fn missing_counter_is_rejected_not_zeroed() {
    let json = r#"[{"date": "2025-01-06", "channel": "A", "unit": "X",
      "qualified": 1, "appointments": 1, "showed": 1, "conversions": 1,
      "revenue": 1, "cost": 1}]"#;
    let err = parse_records(json).unwrap_err();
    assert!(matches!(
      err,
      Error::MalformedRecord {
        index: 0,
        field: "leads",
        ..
      }
    ));
  }

  #[test]
  fn malformed_row_reports_its_position() {
    let json = format!(
      r#"[{ROW}, {{"date": "2025-01-13", "channel": "A", "leads": 1,
        "qualified": 1, "appointments": 1, "showed": 1, "conversions": 1,
        "revenue": 1, "cost": 1}}]"#
    );
    let err = parse_records(&json).unwrap_err();
    assert!(matches!(
      err,
      Error::MalformedRecord {
        index: 1,
        field: "unit",
        ..
      }
    ));
  }

  #[test]
  fn negative_and_fractional_counters_are_rejected() {
    let negative = RawRecord {
      leads: Some(-1.0),
      ..RawRecord::from(&FactRecord::new("d", "c", "u"))
    };
    assert!(matches!(
      negative.validate(0),
      Err(Error::MalformedRecord { reason: "is negative", .. })
    ));

    let fractional = RawRecord {
      showed: Some(2.5),
      ..RawRecord::from(&FactRecord::new("d", "c", "u"))
    };
    assert!(matches!(
      fractional.validate(0),
      Err(Error::MalformedRecord {
        field: "showed",
        reason: "is not a whole number",
        ..
      })
    ));
  }

  #[test]
  fn fractional_money_is_accepted() {
    let raw = RawRecord {
      revenue: Some(10.5),
      ..RawRecord::from(&FactRecord::new("d", "c", "u"))
    };
    assert_eq!(raw.validate(0).unwrap().revenue, 10.5);
  }

  #[test]
  fn oversized_counters_are_rejected() {
    let json = format!(
      r#"[{ROW}, {{"date": "2025-01-13", "channel": "A", "unit": "X",
        "leads": 1e19, "qualified": 1, "appointments": 1, "showed": 1,
        "conversions": 1, "revenue": 1, "cost": 1}}]"#
    );
    assert!(matches!(
      parse_records(&json),
      Err(Error::MalformedRecord {
        index: 1,
        field: "leads",
        reason: "is too large",
      })
    ));

    let at_limit = RawRecord {
      conversions: Some(MAX_COUNTER),
      ..RawRecord::from(&FactRecord::new("d", "c", "u"))
    };
    assert_eq!(at_limit.validate(0).unwrap().conversions, 9_007_199_254_740_991);
  }

  #[test]
  fn deserializing_a_record_validates_it() {
    let negative = r#"{"date": "d", "channel": "c", "unit": "u",
      "leads": 1, "qualified": 1, "appointments": 1, "showed": 1,
      "conversions": 1, "revenue": -5, "cost": 1}"#;
    assert!(serde_json::from_str::<FactRecord>(negative).is_err());

    let record: FactRecord = serde_json::from_str(ROW).unwrap();
    assert_eq!(record.unit, "SP Centro");
  }

  #[test]
  fn digest_tracks_content_and_order() {
    let a = FactRecord::new("2025-01-06", "A", "X").with_funnel([1, 0, 0, 0, 0]);
    let b = FactRecord::new("2025-01-06", "A", "X").with_funnel([2, 0, 0, 0, 0]);
    let digest = digest_records(&[a.clone(), b.clone()]);
    assert_eq!(digest, digest_records(&[a.clone(), b.clone()]));
    assert_ne!(digest, digest_records(&[b.clone(), a.clone()]));
    assert_ne!(digest, digest_records(&[a.clone()]));
    assert_ne!(digest_records(&[]), digest_records(&[a]));
  }

  #[test]
  fn measure_names_parse() {
    assert_eq!("show_rate".parse::<Measure>().ok(), None);
    assert_eq!("appointments".parse::<Measure>().ok(), Some(Measure::Appointments));
  }
}
