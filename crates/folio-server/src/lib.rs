//! HTTP server for folio.
//!
//! Serves every route of a loaded [`Site`] as an exact path for any HTTP
//! method, and falls back to the compiled assets directory for everything
//! else.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use folio_config::Config;
//! use folio_server::{run_server, server_config_from_config};
//! use folio_site::Site;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load(None, None).unwrap();
//!     let site = Arc::new(Site::load(&config.site_resolved).unwrap());
//!
//!     run_server(server_config_from_config(&config), site).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (folio-server)
//!                        │
//!                        ├─► Route table paths ──► Site::render_route
//!                        │                              │
//!                        │                              └─► root module ──► include(...)
//!                        │
//!                        └─► Fallback ──► tower-http ServeDir (compiled assets)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use folio_site::Site;

pub use app::create_router;
pub use error::ServerError;
pub use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory served for paths outside the route table.
    pub compiled_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 30100,
            compiled_dir: PathBuf::from("_compiled"),
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Arguments
///
/// * `config` - Server configuration
/// * `site` - Loaded site
///
/// # Errors
///
/// Returns an error if the address is invalid or the listener cannot bind.
pub async fn run_server(config: ServerConfig, site: Arc<Site>) -> Result<(), ServerError> {
    let routes = site.routes().len();
    let state = Arc::new(AppState::new(site, config.compiled_dir.clone()));
    let app = create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, routes, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from folio config.
#[must_use]
pub fn server_config_from_config(config: &folio_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        compiled_dir: config.assets_resolved.compiled_dir.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_server_config_from_config() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("folio.toml");
        std::fs::write(&path, "[server]\nhost = \"0.0.0.0\"\nport = 9000\n").unwrap();

        let config = folio_config::Config::load(Some(&path), None).unwrap();
        let server = server_config_from_config(&config);

        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 9000);
        assert_eq!(server.compiled_dir, temp.path().join("_compiled"));
    }

    #[tokio::test]
    async fn test_run_server_rejects_invalid_address() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("content")).unwrap();
        std::fs::create_dir_all(temp.path().join("modules")).unwrap();
        let site = Site::load(&folio_config::SiteConfig::with_base(temp.path())).unwrap();

        let config = ServerConfig {
            host: "not an address".to_owned(),
            ..ServerConfig::default()
        };
        let err = run_server(config, Arc::new(site)).await.unwrap_err();
        assert!(matches!(err, ServerError::Address(_)));
    }
}
