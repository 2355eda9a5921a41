//! intel-server binary.
//!
//! Reads `intel.toml` (or the path specified with `--config`), loads the
//! configured record file into a fresh engine, and serves the JSON API over
//! HTTP.
//!
//! # Inspecting a record file
//!
//! To print the snapshot for a file under some selections without serving:
//!
//! ```
//! cargo run -p intel-api --bin intel-server -- --print-snapshot --select unit="SP Sul"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use intel_api::{AppState, ServerConfig, loader::JsonFileSource};
use intel_core::Engine;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Intel Hub dashboard engine server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "intel.toml")]
  config: PathBuf,

  /// Print the snapshot for the configured records as JSON and exit.
  #[arg(long)]
  print_snapshot: bool,

  /// A `dimension=value` selection to apply before printing. Repeatable.
  #[arg(long = "select", value_name = "DIMENSION=VALUE", requires = "print_snapshot")]
  selections: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("INTEL")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let records_path = expand_tilde(&server_cfg.records_path);
  let engine =
    Engine::new(server_cfg.engine.clone()).context("invalid engine configuration")?;

  // Helper mode: print a snapshot and exit.
  if cli.print_snapshot {
    return print_snapshot(engine, &records_path, &cli.selections).await;
  }

  let state = AppState::new(engine, JsonFileSource::new(&records_path));

  // A missing or malformed file leaves the engine empty; `/records/reload`
  // can pick it up later.
  if let Err(e) = intel_api::loader::reload(&state).await {
    tracing::warn!(
      path = ?state.source.path(),
      error = %e,
      "starting with no records"
    );
  }

  let app = intel_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn print_snapshot(
  mut engine: Engine,
  records_path: &Path,
  selections: &[String],
) -> anyhow::Result<()> {
  let json = tokio::fs::read_to_string(records_path)
    .await
    .with_context(|| format!("failed to read {records_path:?}"))?;
  engine.load_json(&json).context("invalid record file")?;

  for selection in selections {
    let (dimension, value) = selection
      .split_once('=')
      .with_context(|| format!("expected DIMENSION=VALUE, got {selection:?}"))?;
    engine
      .toggle_value(dimension.trim(), value.trim())
      .with_context(|| format!("cannot select {selection:?}"))?;
  }

  let out = serde_json::to_string_pretty(&*engine.snapshot())
    .context("failed to serialise snapshot")?;
  println!("{out}");
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
