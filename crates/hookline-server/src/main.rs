//! hookline server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), layered
//! under `HOOKLINE_*` environment variables, and serves the webhook feed
//! over HTTP. The SQLite store is opened lazily on first use, so a missing
//! or locked database never keeps the server from starting.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use hookline_server::{AppState, ServerConfig, gateway::Gateway};
use hookline_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "hookline webhook event feed")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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
    .add_source(config::Environment::with_prefix("HOOKLINE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);
  let connect_timeout = Duration::from_millis(server_cfg.connect_timeout_ms);

  // Build application state.
  let state = AppState {
    gateway: Arc::new(Gateway::new(
      move || SqliteStore::open(store_path.clone()),
      connect_timeout,
    )),
    config:  Arc::new(server_cfg.clone()),
  };

  let app = hookline_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

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
