#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the HDB block map.
//!
//! Loads the block and transaction tables once at startup, then serves
//! scene and selection requests from the immutable [`AppContext`]. An
//! optional directory of frontend assets is served at `/`.

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use hdb_map_dataset::{DataPaths, LoadOptions};
use hdb_map_view::{AppContext, StartupError};

/// Default bind address when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default port when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 8080;

/// Shared application state.
pub struct AppState {
    /// Catalog, datasets and map credential, loaded once at startup.
    pub context: Arc<AppContext>,
}

/// Everything needed to start the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Input file locations.
    pub paths: DataPaths,
    /// How the tables are interpreted.
    pub load: LoadOptions,
    /// Frontend assets to serve at `/`, if any.
    pub static_dir: Option<PathBuf>,
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
}

impl ServerConfig {
    /// Builds a config with the bind address and port taken from the
    /// `BIND_ADDR` and `PORT` environment variables.
    #[must_use]
    pub fn from_env(paths: DataPaths, load: LoadOptions, static_dir: Option<PathBuf>) -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            paths,
            load,
            static_dir,
            bind_addr,
            port,
        }
    }
}

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The datasets or metric registry could not be loaded.
    #[error(transparent)]
    Startup(#[from] StartupError),

    /// The HTTP server failed to bind or run.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/controls", web::get().to(handlers::controls))
            .route("/scene", web::get().to(handlers::scene))
            .route("/transactions", web::get().to(handlers::transactions)),
    );
}

/// Starts the HDB block map API server.
///
/// Loads the context before binding, so no request is ever served against
/// partially loaded data. This is a regular async function; the caller
/// provides the runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError::Startup`] if the data fails to load and
/// [`ServerError::Io`] if the HTTP server fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    log::info!("Loading datasets...");
    let context = AppContext::load(&config.paths, &config.load)?;

    if context.access_token().is_none() {
        log::info!("Mapbox style disabled: no access token loaded");
    }

    let state = web::Data::new(AppState {
        context: Arc::new(context),
    });
    let static_dir = config.static_dir;

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();
        let static_dir = static_dir.clone();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            .configure(move |cfg| {
                // Serve frontend static files (production)
                if let Some(dir) = static_dir {
                    cfg.service(Files::new("/", dir).index_file("index.html"));
                }
            })
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await?;

    Ok(())
}
