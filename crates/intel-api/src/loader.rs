//! Record loading: the JSON file source and the load generation counter.
//!
//! Every load takes a ticket from [`LoadTracker::begin`]: a file reload before
//! it fetches, a request body once it has parsed. By the time a fetch finishes
//! a newer load may have started; the older result is then discarded rather
//! than applied, so the engine only ever receives the most recent collection.
//! A body that fails to parse never takes a ticket and supersedes nothing.

use std::{
  future::Future,
  path::{Path, PathBuf},
  sync::atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use intel_core::{
  record::{FactRecord, parse_records},
  source::RecordSource,
};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{AppState, error::ApiError, handlers::View};

// ─── JSON file source ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to read {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid records in {path:?}: {source}")]
  Records {
    path:   PathBuf,
    #[source]
    source: intel_core::Error,
  },
}

/// Reads a JSON array of raw records from a file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
  path: PathBuf,
}

impl JsonFileSource {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }
}

impl RecordSource for JsonFileSource {
  type Error = LoadError;

  fn describe(&self) -> String { format!("file {}", self.path.display()) }

  fn fetch(
    &self,
  ) -> impl Future<Output = Result<Vec<FactRecord>, Self::Error>> + Send + '_ {
    async move {
      let json = tokio::fs::read_to_string(&self.path).await.map_err(
        |source| LoadError::Io {
          path: self.path.clone(),
          source,
        },
      )?;
      parse_records(&json).map_err(|source| LoadError::Records {
        path: self.path.clone(),
        source,
      })
    }
  }
}

// ─── Generations ──────────────────────────────────────────────────────────────

/// What the dashboard is currently showing, and where it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Freshness {
  /// Description of the source of the last applied load.
  pub source:     Option<String>,
  pub loaded_at:  Option<DateTime<Utc>>,
  pub records:    usize,
  /// Generation of the last applied load; zero before any.
  pub generation: u64,
}

#[derive(Debug, Default)]
pub struct LoadTracker {
  generation: AtomicU64,
  freshness:  RwLock<Freshness>,
}

impl LoadTracker {
  /// Start a load and return its ticket. Any load holding an older ticket is
  /// superseded from this point on.
  pub fn begin(&self) -> u64 { self.generation.fetch_add(1, Ordering::SeqCst) + 1 }

  pub fn is_current(&self, ticket: u64) -> bool {
    self.generation.load(Ordering::SeqCst) == ticket
  }

  /// The most recently issued ticket.
  pub fn latest(&self) -> u64 { self.generation.load(Ordering::SeqCst) }

  pub async fn freshness(&self) -> Freshness { self.freshness.read().await.clone() }
}

// ─── Loading ──────────────────────────────────────────────────────────────────

/// Fetch the full collection from the state's source and load it.
///
/// The returned view is taken under the same lock that applied the records.
pub async fn reload<R>(
  state: &AppState<R>,
) -> Result<View, ApiError>
where
  R: RecordSource,
{
  let ticket = state.loads.begin();
  let source = state.source.describe();
  info!(%source, generation = ticket, "loading records");

  let records = state.source.fetch().await.map_err(|e| {
    warn!(%source, generation = ticket, error = %e, "record load failed");
    ApiError::Source(Box::new(e))
  })?;
  apply(state, ticket, source, records).await
}

/// Validate `json` as a record array and load it.
pub async fn replace<R>(
  state: &AppState<R>,
  json: &str,
) -> Result<View, ApiError>
where
  R: RecordSource,
{
  let records = parse_records(json).inspect_err(|e| {
    warn!(error = %e, "rejected record snapshot");
  })?;
  let ticket = state.loads.begin();
  apply(state, ticket, "request body".to_owned(), records).await
}

async fn apply<R>(
  state: &AppState<R>,
  ticket: u64,
  source: String,
  records: Vec<FactRecord>,
) -> Result<View, ApiError> {
  let mut engine = state.engine.write().await;
  if !state.loads.is_current(ticket) {
    let latest = state.loads.latest();
    warn!(%source, generation = ticket, latest, "discarding superseded load");
    return Err(ApiError::Superseded(format!(
      "load {ticket} was superseded by load {latest}"
    )));
  }

  let count = records.len();
  engine.set_data(records)?;
  *state.loads.freshness.write().await = Freshness {
    source:     Some(source.clone()),
    loaded_at:  Some(Utc::now()),
    records:    count,
    generation: ticket,
  };
  info!(
    %source,
    generation = ticket,
    records = count,
    version = engine.version(),
    "records loaded"
  );
  Ok(View::of(&engine))
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir()
      .join(format!("intel-loader-{}-{name}.json", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
  }

  #[tokio::test]
  async fn file_source_parses_records() {
    let path = temp_file(
      "ok",
      r#"[{"date": "2025-01-06", "channel": "A", "unit": "X",
          "leads": 10, "qualified": 7, "appointments": 5, "showed": 4,
          "conversions": 2, "revenue": 800.0, "cost": 300.0}]"#,
    );
    let source = JsonFileSource::new(&path);
    let records = source.fetch().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].channel, "A");
    assert!(source.describe().contains("intel-loader"));
    std::fs::remove_file(path).ok();
  }

  #[tokio::test]
  async fn missing_file_is_an_io_error() {
    let source = JsonFileSource::new("/nonexistent/intel/records.json");
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
  }

  #[tokio::test]
  async fn malformed_file_names_the_row() {
    let path = temp_file("bad", r#"[{"date": "2025-01-06"}]"#);
    let err = JsonFileSource::new(&path).fetch().await.unwrap_err();
    assert!(matches!(
      err,
      LoadError::Records {
        source: intel_core::Error::MalformedRecord { index: 0, .. },
        ..
      }
    ));
    std::fs::remove_file(path).ok();
  }

  #[test]
  fn newer_tickets_supersede_older_ones() {
    let loads = LoadTracker::default();
    let first = loads.begin();
    assert!(loads.is_current(first));
    let second = loads.begin();
    assert!(!loads.is_current(first));
    assert!(loads.is_current(second));
    assert_eq!(loads.latest(), second);
  }
}
