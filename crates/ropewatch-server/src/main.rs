//! ropewatch server binary.
//!
//! Loads [`ServerConfig`], opens the SQLite event log and serves the JSON API
//! over HTTP. Run with `--hash-password` to produce the argon2 PHC string for
//! `auth_password_hash`:
//!
//! ```text
//! cargo run -p ropewatch-server --bin server -- --hash-password
//! ```

use std::{io::BufRead as _, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use ropewatch_server::{
  AppState, ServerConfig,
  auth::{AuthConfig, hash_password},
};
use ropewatch_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Rope safety lifecycle server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password read from stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let hash = hash_password(line.trim_end_matches(['\r', '\n']))
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  if let Some(dir) = cfg.store_path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {dir:?}"))?;
  }
  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  tracing::info!(path = ?cfg.store_path, "store opened");

  let app = ropewatch_server::router(AppState {
    store:      Arc::new(store),
    auth:       Arc::new(AuthConfig {
      username:      cfg.auth_username.clone(),
      password_hash: cfg.auth_password_hash.clone(),
    }),
    public_url: cfg.public_url(),
  });

  let address = cfg.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!(%address, public_url = %cfg.public_url(), "listening");

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}
