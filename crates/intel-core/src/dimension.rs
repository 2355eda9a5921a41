//! Dimensions: the categorical axes a user can facet over.
//!
//! Definitions arrive as configuration (`{id, label, field}`) and are resolved
//! once at startup into a [`DimensionSet`]. Resolution binds each dimension to
//! a typed projection over [`FactRecord`], so an unknown or numeric field is a
//! startup error rather than an empty facet list later on.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result, record::FactRecord, record::Measure};

// ─── Field projection ────────────────────────────────────────────────────────

/// A categorical [`FactRecord`] field.
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
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DimensionField {
  Date,
  Channel,
  Unit,
}

impl DimensionField {
  /// Resolve a field name from configuration.
  pub fn resolve(name: &str) -> Result<Self> {
    if let Ok(field) = name.parse::<Self>() {
      return Ok(field);
    }
    if name.parse::<Measure>().is_ok() {
      return Err(Error::NotCategorical(name.to_owned()));
    }
    Err(Error::UnknownField(name.to_owned()))
  }

  /// The facet value `record` carries for this field.
  pub fn project<'r>(&self, record: &'r FactRecord) -> &'r str {
    match self {
      Self::Date => &record.date,
      Self::Channel => &record.channel,
      Self::Unit => &record.unit,
    }
  }
}

// ─── Definitions ─────────────────────────────────────────────────────────────

/// Static dimension configuration, as written in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDefinition {
  /// Stable key used by selection actions.
  pub id:    String,
  pub label: String,
  /// Name of the [`FactRecord`] field this dimension facets over.
  pub field: String,
}

impl DimensionDefinition {
  pub fn new(
    id: impl Into<String>,
    label: impl Into<String>,
    field: impl Into<String>,
  ) -> Self {
    Self {
      id:    id.into(),
      label: label.into(),
      field: field.into(),
    }
  }
}

/// The channel and unit dimensions.
pub fn default_definitions() -> Vec<DimensionDefinition> {
  vec![
    DimensionDefinition::new("channel", "Channel", "channel"),
    DimensionDefinition::new("unit", "Unit", "unit"),
  ]
}

/// A resolved dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
  pub id:    String,
  pub label: String,
  pub field: DimensionField,
}

impl Dimension {
  pub fn value_of<'r>(&self, record: &'r FactRecord) -> &'r str {
    self.field.project(record)
  }
}

/// The validated, ordered list of dimensions the engine facets over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionSet {
  dimensions: Vec<Dimension>,
}

impl DimensionSet {
  /// Resolve every definition, rejecting duplicate ids and unusable fields.
  pub fn new(definitions: &[DimensionDefinition]) -> Result<Self> {
    let mut dimensions: Vec<Dimension> = Vec::with_capacity(definitions.len());
    for def in definitions {
      if dimensions.iter().any(|d| d.id == def.id) {
        return Err(Error::DuplicateDimension(def.id.clone()));
      }
      dimensions.push(Dimension {
        id:    def.id.clone(),
        label: def.label.clone(),
        field: DimensionField::resolve(&def.field)?,
      });
    }
    Ok(Self { dimensions })
  }

  pub fn get(&self, id: &str) -> Option<&Dimension> {
    self.dimensions.iter().find(|d| d.id == id)
  }

  pub fn contains(&self, id: &str) -> bool { self.get(id).is_some() }

  pub fn iter(&self) -> impl Iterator<Item = &Dimension> {
    self.dimensions.iter()
  }
}

impl Default for DimensionSet {
  fn default() -> Self {
    // The built-in definitions always resolve.
    Self {
      dimensions: vec![
        Dimension {
          id:    "channel".into(),
          label: "Channel".into(),
          field: DimensionField::Channel,
        },
        Dimension {
          id:    "unit".into(),
          label: "Unit".into(),
          field: DimensionField::Unit,
        },
      ],
    }
  }
}
