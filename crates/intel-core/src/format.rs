//! Display formatting for KPI values (pt-BR conventions, BRL currency).

use serde::{Deserialize, Serialize};

/// How a KPI value is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueUnit {
  Currency,
  Percent,
  Number,
}

impl ValueUnit {
  pub fn format(&self, value: f64) -> String {
    match self {
      Self::Currency => format_currency(value),
      Self::Percent => format_percent(value),
      Self::Number => format_compact(value),
    }
  }
}

/// `R$ 1.234.567`: whole reais, `.` as the thousands separator.
pub fn format_currency(value: f64) -> String {
  let rounded = value.round();
  let sign = if rounded < 0.0 { "-" } else { "" };
  format!("{sign}R$ {}", group_thousands(rounded.abs() as u64))
}

/// `1.2M`, `3.5K`, or the grouped number below a thousand.
pub fn format_compact(value: f64) -> String {
  if value >= 1_000_000.0 {
    return format!("{:.1}M", value / 1_000_000.0);
  }
  if value >= 1_000.0 {
    return format!("{:.1}K", value / 1_000.0);
  }
  format_decimal(value)
}

/// `73.5%`
pub fn format_percent(value: f64) -> String { format!("{value:.1}%") }

/// `+12.3%` / `-5.1%`
pub fn format_variation(value: f64) -> String {
  let sign = if value >= 0.0 { "+" } else { "" };
  format!("{sign}{value:.1}%")
}

/// Grouped integer part, `,` before up to three fraction digits.
fn format_decimal(value: f64) -> String {
  let sign = if value < 0.0 { "-" } else { "" };
  let scaled = (value.abs() * 1000.0).round() as u64;
  let (int, frac) = (scaled / 1000, scaled % 1000);
  if frac == 0 {
    return format!("{sign}{}", group_thousands(int));
  }
  let frac = format!("{frac:03}");
  format!("{sign}{},{}", group_thousands(int), frac.trim_end_matches('0'))
}

fn group_thousands(n: u64) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push('.');
    }
    out.push(ch);
  }
  out
}
