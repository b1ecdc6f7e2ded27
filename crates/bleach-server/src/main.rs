//! bleach-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus the
//! environment, opens the SQLite store named by `DATABASE_URL`, makes sure a
//! selection exists and serves it over HTTP.
//!
//! ```
//! DATABASE_URL=sqlite:///var/lib/bleach/bleach.db cargo run -p bleach-server
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use bleach_core::refresh::RefreshEngine;
use bleach_server::{ServerConfig, open_store, refresher};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Daily Bleach selection server")]
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

  // Load configuration. A missing DATABASE_URL stops here.
  let server_cfg =
    ServerConfig::load(&cli.config).context("failed to load configuration")?;
  let location = server_cfg.database().context("bad DATABASE_URL")?;

  // Open SQLite store.
  let store = open_store(&location)
    .await
    .with_context(|| format!("failed to open store at {location:?}"))?;

  if let Some(seed_path) = &server_cfg.seed_path {
    let sql = tokio::fs::read_to_string(seed_path)
      .await
      .with_context(|| format!("failed to read seed file {seed_path:?}"))?;
    store
      .seed(sql)
      .await
      .with_context(|| format!("failed to apply seed file {seed_path:?}"))?;
    tracing::info!(?seed_path, "seed data applied");
  }

  let engine = Arc::new(RefreshEngine::new(store));
  refresher::bootstrap(&*engine)
    .await
    .context("failed to initialise selection")?;

  if server_cfg.background_refresh {
    tokio::spawn(refresher::run(engine.clone()));
  }

  let app = bleach_api::api_router(engine);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
