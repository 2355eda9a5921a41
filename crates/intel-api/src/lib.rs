//! JSON REST API over a shared [`Engine`].
//!
//! Exposes an axum [`Router`] whose handlers read and transition one engine
//! behind an async lock. Record collections arrive through any
//! [`RecordSource`]; the server binary wires in a [`loader::JsonFileSource`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", intel_api::router(state.clone()))
//! ```

pub mod error;
pub mod etag;
pub mod handlers;
pub mod loader;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use intel_core::{Engine, EngineConfig, source::RecordSource};
use serde::Deserialize;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
use handlers::{records, selections, snapshot};
use loader::LoadTracker;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `intel.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  /// JSON array of records loaded at startup and on `/records/reload`.
  pub records_path: PathBuf,
  pub engine:       EngineConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:         "127.0.0.1".to_string(),
      port:         8080,
      records_path: PathBuf::from("records.json"),
      engine:       EngineConfig::default(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<R> {
  pub engine: Arc<RwLock<Engine>>,
  pub source: Arc<R>,
  pub loads:  Arc<LoadTracker>,
}

impl<R> AppState<R> {
  pub fn new(engine: Engine, source: R) -> Self {
    Self {
      engine: Arc::new(RwLock::new(engine)),
      source: Arc::new(source),
      loads:  Arc::new(LoadTracker::default()),
    }
  }
}

impl<R> Clone for AppState<R> {
  fn clone(&self) -> Self {
    Self {
      engine: Arc::clone(&self.engine),
      source: Arc::clone(&self.source),
      loads:  Arc::clone(&self.loads),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<R>(state: AppState<R>) -> Router
where
  R: RecordSource + 'static,
{
  Router::new()
    // Selectors
    .route("/snapshot", get(snapshot::full::<R>))
    .route("/dimensions", get(snapshot::dimensions::<R>))
    .route("/kpis", get(snapshot::kpis::<R>))
    .route("/series", get(snapshot::series::<R>))
    .route("/funnel", get(snapshot::funnel::<R>))
    // Selections
    .route("/selections", delete(selections::clear_all::<R>))
    .route("/selections/toggle", post(selections::toggle::<R>))
    .route("/selections/{dimension}", delete(selections::clear_one::<R>))
    // Records
    .route(
      "/records",
      get(snapshot::records::<R>).put(records::replace::<R>),
    )
    .route("/records/reload", post(records::reload::<R>))
    .route("/freshness", get(records::freshness::<R>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
