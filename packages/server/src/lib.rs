#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the radon map application.
//!
//! Serves the storm track, radon test results (optionally filtered to the
//! neighborhood of the track), and ranked neighborhood statistics for the
//! map frontend. Every data endpoint answers 200 with best-effort data;
//! when the warehouse is disabled or failing, static datasets are served
//! and the `X-Data-Origin` header says so.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use radon_map_analytics::hot::{self, AggregateFields};
use radon_map_source::engine::RadonEngine;
use radon_map_source::orchestrator::Orchestrator;
use radon_map_source::registry::QueryDefinition;
use radon_map_warehouse::WarehouseSettings;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8000;

/// Shared application state.
pub struct AppState {
    /// Storm track and radon result lookups.
    pub engine: RadonEngine,
    /// Neighborhood aggregate query definition.
    pub hot_neighborhoods: QueryDefinition<AggregateFields>,
}

impl AppState {
    /// Builds state around an orchestrator.
    #[must_use]
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            engine: RadonEngine::new(orchestrator),
            hot_neighborhoods: hot::definition(),
        }
    }

    /// Builds state from resolved warehouse settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the warehouse HTTP client cannot be built.
    pub fn from_settings(settings: &WarehouseSettings) -> std::io::Result<Self> {
        let warehouse = radon_map_warehouse::connect(settings).map_err(std::io::Error::other)?;
        if warehouse.is_none() {
            log::warn!(
                "Serving static sample data; set SNOWFLAKE_* variables to query live data"
            );
        }
        Ok(Self::new(Orchestrator::new(warehouse)))
    }
}

/// Registers every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::root)).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/status", web::get().to(handlers::status))
            .route("/map/tornado-path", web::get().to(handlers::tornado_path))
            .route("/map/radon-results", web::get().to(handlers::radon_results))
            .route(
                "/radon/hot-neighborhoods",
                web::get().to(handlers::hot_neighborhoods),
            ),
    );
}

/// Starts the radon map API server.
///
/// Resolves warehouse settings from the environment, builds the upstream
/// client, and starts the Actix-Web HTTP server. The caller provides the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the warehouse HTTP client cannot
/// be built, or the HTTP server fails to bind or encounters a runtime
/// error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let state = web::Data::new(AppState::from_settings(&WarehouseSettings::from_env())?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn settings_without_credentials_build_offline_state() {
        let settings = WarehouseSettings::from_lookup(|_| None);
        assert!(!settings.is_enabled());

        let state = AppState::from_settings(&settings).unwrap();

        assert!(state.engine.orchestrator().warehouse().is_none());
        assert!(!state.engine.status().await.enabled);
    }
}
