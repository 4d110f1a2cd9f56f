//! HTTP API for Skycast
//!
//! Exposes the location service over JSON routes under `/api/locations`
//! plus a `/health` check.

pub mod error;
pub mod handlers;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use skycast_core::{AppError, Config, ConfigError};
use skycast_services::{LocationClient, LocationService};
use skycast_weather::WeatherProvider;

pub use error::{handle_rejection, ApiError, ErrorBody};
pub use routes::routes;

/// Build the location service described by the configuration.
///
/// # Errors
/// Fails when the API key is missing, the weather base URL is invalid or
/// the store cannot be opened.
pub fn build_service(config: &Config) -> Result<LocationService, AppError> {
    let api_key = config
        .weather
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingSetting("weather.api_key".into()))?;

    let weather = WeatherProvider::with_base_url(
        &config.weather.base_url,
        api_key,
        config.weather.units,
    )
    .map_err(|e| AppError::service(format!("Failed to create weather client: {}", e)))?;

    let store = LocationClient::open(&config.store_url())?;

    Ok(LocationService::new(store, Arc::new(weather)))
}

/// Run the HTTP server until Ctrl-C.
///
/// # Errors
/// Fails when the service cannot be built or the port cannot be bound.
pub async fn serve(config: &Config) -> Result<(), AppError> {
    let service = build_service(config)?;
    let routes = routes(service, config.server.allowed_origin.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .map_err(|e| {
            AppError::Other(anyhow::anyhow!(
                "Failed to bind port {}: {}",
                config.server.port,
                e
            ))
        })?;

    tracing::info!("Skycast server listening on http://{}", addr);
    server.await;
    tracing::info!("Server stopped");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_service_requires_api_key() {
        let config = Config {
            storage: skycast_core::StorageConfig {
                url: Some("sqlite::memory:".into()),
            },
            ..Config::default()
        };

        let err = build_service(&config).err().unwrap();
        assert!(matches!(err, AppError::Config(ConfigError::MissingSetting(_))));
    }

    #[test]
    fn test_build_service_with_memory_store() {
        let mut config = Config::default();
        config.weather.api_key = Some("test-key".into());
        config.storage.url = Some("sqlite::memory:".into());

        assert!(build_service(&config).is_ok());
    }

    #[test]
    fn test_build_service_rejects_unknown_store() {
        let mut config = Config::default();
        config.weather.api_key = Some("test-key".into());
        config.storage.url = Some("mongodb://localhost/weather".into());

        assert!(matches!(
            build_service(&config).err(),
            Some(AppError::Service(_))
        ));
    }
}
