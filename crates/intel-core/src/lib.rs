//! Associative filtering and aggregation engine for the Intel Hub dashboards.
//!
//! Takes a flat collection of fact records, applies simultaneous facet
//! selections across several dimensions, and re-derives every KPI, chart
//! series, and funnel from the filtered subset. For each facet value it also
//! reports whether selecting it would still produce results.
//!
//! This crate does no I/O. Records come in through a [`source::RecordSource`]
//! or [`Engine::load_json`]; snapshots go out as plain serialisable data.

pub mod aggregate;
pub mod associative;
pub mod config;
pub mod derive;
pub mod dimension;
pub mod engine;
pub mod error;
pub mod filter;
pub mod format;
pub mod record;
pub mod selection;
pub mod source;

pub use config::EngineConfig;
pub use derive::{DerivedSnapshot, derive};
pub use engine::Engine;
pub use error::{Error, Result};
