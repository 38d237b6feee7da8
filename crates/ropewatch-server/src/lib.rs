//! HTTP server for ropewatch.
//!
//! Mounts the JSON API from `ropewatch-api` under `/api`, guarding its write
//! routes with HTTP Basic auth, and serves a plain-text landing page at `/`.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, middleware, routing::get};
use config::{Config, ConfigError, Environment, Source};
use ropewatch_api::{ApiState, read_router, write_router};
use ropewatch_core::store::RopeStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROPEWATCH_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
  /// Externally visible URL of the API, e.g. `https://ropes.example.org/api`.
  /// Defaults to `http://{host}:{port}/api`.
  pub public_url:         Option<String>,
}

impl ServerConfig {
  /// Load defaults, then the TOML file at `path` if it exists, then
  /// `ROPEWATCH_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_source(config::File::from(path).required(false))
  }

  fn from_source<T>(file: T) -> Result<Self, ConfigError>
  where
    T: Source + Send + Sync + 'static,
  {
    let mut cfg: Self = Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("store_path", "~/.local/share/ropewatch/ropewatch.db")?
      .add_source(file)
      .add_source(Environment::with_prefix("ROPEWATCH"))
      .build()?
      .try_deserialize()?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn public_url(&self) -> String {
    self
      .public_url
      .clone()
      .unwrap_or_else(|| format!("http://{}/api", self.address()))
  }
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

// ─── Application state ────────────────────────────────────────────────────────

/// Everything [`router`] needs to serve requests.
pub struct AppState<S: RopeStore> {
  pub store:      Arc<S>,
  pub auth:       Arc<AuthConfig>,
  /// See [`ServerConfig::public_url`].
  pub public_url: String,
}

// ─── Router ───────────────────────────────────────────────────────────────────

const LANDING: &str = "ropewatch: rope safety lifecycle tracker\n\
  Scan a rope tag, or GET /api/ropes/{id} for its status.\n";

/// Build the top-level axum [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RopeStore + 'static,
{
  let api = ApiState::new(state.store).with_public_url(&state.public_url);
  let writes = write_router(api.clone())
    .route_layer(middleware::from_fn_with_state(state.auth, require_auth));

  Router::new()
    .route("/", get(landing))
    .nest("/api", read_router(api).merge(writes))
    .fallback(not_found)
    .layer(TraceLayer::new_for_http())
}

async fn landing() -> &'static str { LANDING }

async fn not_found() -> Error { Error::NotFound }

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use config::FileFormat;
  use ropewatch_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  use crate::auth::hash_password;

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let hash  = hash_password(password).unwrap();

    AppState {
      store:      Arc::new(store),
      auth:       Arc::new(AuthConfig {
        username:      "admin".to_string(),
        password_hash: hash,
      }),
      public_url: "http://ropes.test/api".to_string(),
    }
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn oneshot_raw(
    app:     Router,
    method:  &str,
    uri:     &str,
    headers: Vec<(header::HeaderName, String)>,
    body:    &str,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(req).await.unwrap()
  }

  async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  const NEW_ROPE: &str = r#"{
    "product_name":  "Static 10.5",
    "thickness":     "10.5mm",
    "purchase_date": "2024-01-01"
  }"#;

  // ── Configuration ────────────────────────────────────────────────────────────

  fn config_from(toml: &str) -> Result<ServerConfig, ConfigError> {
    ServerConfig::from_source(config::File::from_str(toml, FileFormat::Toml))
  }

  #[test]
  fn config_fills_defaults() {
    let cfg = config_from(
      r#"
        auth_username      = "admin"
        auth_password_hash = "$argon2id$v=19$stub"
        store_path         = "/var/lib/ropewatch/ropes.db"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/ropewatch/ropes.db"));
    assert_eq!(cfg.public_url(), "http://127.0.0.1:8080/api");
  }

  #[test]
  fn config_file_overrides_defaults() {
    let cfg = config_from(
      r#"
        host               = "0.0.0.0"
        port               = 9000
        auth_username      = "admin"
        auth_password_hash = "$argon2id$v=19$stub"
        public_url         = "https://ropes.example.org/api"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:9000");
    assert_eq!(cfg.public_url(), "https://ropes.example.org/api");
  }

  #[test]
  fn config_requires_credentials() {
    assert!(config_from("port = 9000").is_err());
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/r.db")), PathBuf::from(home).join("r.db"));
    assert_eq!(expand_tilde(Path::new("/abs/r.db")), PathBuf::from("/abs/r.db"));
  }

  // ── Landing / fallback ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn landing_page_is_plain_text() {
    let app  = router(make_state("secret").await);
    let resp = oneshot_raw(app, "GET", "/", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("ropewatch"));
  }

  #[tokio::test]
  async fn unknown_path_is_404() {
    let app  = router(make_state("secret").await);
    let resp = oneshot_raw(app, "GET", "/nope", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Auth boundary ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn read_routes_are_public() {
    let app  = router(make_state("secret").await);
    let resp = oneshot_raw(app, "GET", "/api/ropes/NOSUCHROPE", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn write_routes_require_auth() {
    let app  = router(make_state("secret").await);
    let resp = oneshot_raw(
      app,
      "POST",
      "/api/admin/ropes",
      vec![(header::CONTENT_TYPE, "application/json".into())],
      NEW_ROPE,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert_eq!(challenge, "Basic realm=\"ropewatch\"");
  }

  #[tokio::test]
  async fn wrong_password_is_rejected() {
    let app  = router(make_state("secret").await);
    let resp = oneshot_raw(
      app,
      "GET",
      "/api/admin/ropes",
      vec![(header::AUTHORIZATION, auth_header("admin", "guess"))],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn authenticated_create_then_public_read() {
    let state = make_state("secret").await;
    let store = Arc::clone(&state.store);
    let app   = router(state);

    let resp = oneshot_raw(
      app.clone(),
      "POST",
      "/api/admin/ropes",
      vec![
        (header::AUTHORIZATION, auth_header("admin", "secret")),
        (header::CONTENT_TYPE, "application/json".into()),
      ],
      NEW_ROPE,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    let id = created["rope_id"].as_str().unwrap().to_owned();
    assert_eq!(created["tag_url"], format!("http://ropes.test/api/ropes/{id}"));
    assert_eq!(store.list_ropes().await.unwrap().len(), 1);

    let resp = oneshot_raw(app, "GET", &format!("/api/ropes/{id}"), vec![], "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let view: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(view["rope"]["product_name"], "Static 10.5");
    assert!(view["status"].is_string());
  }
}
