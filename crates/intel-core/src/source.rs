//! The `RecordSource` trait: where snapshots of fact records come from.
//!
//! Fetching is the only asynchronous step around the engine. Sources hand
//! over a complete, validated collection; the engine never sees a partial
//! one.

use std::future::Future;

use crate::record::FactRecord;

/// A producer of complete record snapshots.
///
/// Implemented by the outer layers (files, HTTP fetchers, fixtures).
pub trait RecordSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// A short description of the source, for logs and freshness reports.
  fn describe(&self) -> String;

  /// Fetch and validate the full record collection.
  fn fetch(
    &self,
  ) -> impl Future<Output = Result<Vec<FactRecord>, Self::Error>> + Send + '_;
}

/// A fixed in-memory collection.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
  records: Vec<FactRecord>,
}

impl StaticSource {
  pub fn new(records: Vec<FactRecord>) -> Self { Self { records } }
}

impl RecordSource for StaticSource {
  type Error = std::convert::Infallible;

  fn describe(&self) -> String {
    format!("static ({} records)", self.records.len())
  }

  fn fetch(
    &self,
  ) -> impl Future<Output = Result<Vec<FactRecord>, Self::Error>> + Send + '_ {
    std::future::ready(Ok(self.records.clone()))
  }
}
