//! Error types for `intel-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("record {index}: field `{field}` {reason}")]
  MalformedRecord {
    index:  usize,
    field:  &'static str,
    reason: &'static str,
  },

  #[error("unknown record field: {0:?}")]
  UnknownField(String),

  #[error("field {0:?} is a numeric measure and cannot be faceted")]
  NotCategorical(String),

  #[error("dimension {0:?} is defined more than once")]
  DuplicateDimension(String),

  #[error("unknown dimension: {0:?}")]
  UnknownDimension(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
