//! Route table.

use std::convert::Infallible;

use skycast_services::{LocationPatch, LocationService};
use warp::cors::Builder;
use warp::{Filter, Rejection, Reply};

use crate::error::handle_rejection;
use crate::handlers::{self, CreateLocation};

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Every route, with rejection recovery, CORS and request tracing applied.
///
/// Route errors are recovered inside the CORS wrapper so they carry CORS
/// headers. The outer recover covers refused origins.
pub fn routes(
    service: LocationService,
    allowed_origin: Option<&str>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    locations(service)
        .or(health())
        .recover(handle_rejection)
        .with(cors(allowed_origin))
        .recover(handle_rejection)
        .with(warp::trace::request())
}

/// `GET /health`
pub fn health() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("health").and(warp::get()).map(handlers::health)
}

/// The `/api/locations` tree.
pub fn locations(
    service: LocationService,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let list = warp::path!("api" / "locations")
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(handlers::list_locations);

    let create = warp::path!("api" / "locations")
        .and(warp::post())
        .and(json_body::<CreateLocation>())
        .and(with_service(service.clone()))
        .and_then(handlers::create_location);

    let get = warp::path!("api" / "locations" / String)
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(handlers::get_location);

    let update = warp::path!("api" / "locations" / String)
        .and(warp::put())
        .and(json_body::<LocationPatch>())
        .and(with_service(service.clone()))
        .and_then(handlers::update_location);

    let delete = warp::path!("api" / "locations" / String)
        .and(warp::delete())
        .and(with_service(service.clone()))
        .and_then(handlers::delete_location);

    let sync = warp::path!("api" / "locations" / String / "sync")
        .and(warp::post())
        .and(with_service(service.clone()))
        .and_then(handlers::sync_location);

    let forecast = warp::path!("api" / "locations" / String / "forecast")
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(handlers::location_forecast);

    let snapshots = warp::path!("api" / "locations" / String / "snapshots")
        .and(warp::get())
        .and(with_service(service))
        .and_then(handlers::location_snapshots);

    list.or(create)
        .or(get)
        .or(update)
        .or(delete)
        .or(sync)
        .or(forecast)
        .or(snapshots)
}

fn with_service(
    service: LocationService,
) -> impl Filter<Extract = (LocationService,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// CORS policy: the configured origin with credentials, or any origin
/// without credentials when unset or `*`.
pub fn cors(allowed_origin: Option<&str>) -> Builder {
    let builder = warp::cors()
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    match allowed_origin.and_then(normalize_origin) {
        Some(origin) => builder.allow_origin(origin.as_str()).allow_credentials(true),
        None => builder.allow_any_origin(),
    }
}

/// Reduce a configured origin URL to `scheme://host[:port]`.
fn normalize_origin(origin: &str) -> Option<String> {
    let origin = origin.trim();
    if origin.is_empty() || origin == "*" {
        return None;
    }

    match url::Url::parse(origin) {
        Ok(url) if url.origin().is_tuple() => Some(url.origin().ascii_serialization()),
        _ => {
            tracing::warn!("Ignoring invalid allowed origin {:?}, accepting any origin", origin);
            None
        }
    }
}
