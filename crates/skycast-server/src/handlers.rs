//! Request handlers. Each one delegates to [`LocationService`] and leaves
//! error mapping to [`crate::error`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use skycast_services::{LocationPatch, LocationService};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::error::reject;

/// Body of `POST /api/locations`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateLocation {
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Serialize)]
struct Message {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    timestamp: chrono::DateTime<Utc>,
}

pub async fn list_locations(service: LocationService) -> Result<impl Reply, Rejection> {
    let locations = service.list().await.map_err(reject)?;
    Ok(warp::reply::json(&locations))
}

pub async fn create_location(
    body: CreateLocation,
    service: LocationService,
) -> Result<impl Reply, Rejection> {
    let location = service.add(&body.city).await.map_err(reject)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&location),
        StatusCode::CREATED,
    ))
}

pub async fn get_location(id: String, service: LocationService) -> Result<impl Reply, Rejection> {
    let location = service.get(&id).await.map_err(reject)?;
    Ok(warp::reply::json(&location))
}

pub async fn update_location(
    id: String,
    patch: LocationPatch,
    service: LocationService,
) -> Result<impl Reply, Rejection> {
    let location = service.patch(&id, patch).await.map_err(reject)?;
    Ok(warp::reply::json(&location))
}

pub async fn delete_location(
    id: String,
    service: LocationService,
) -> Result<impl Reply, Rejection> {
    service.delete(&id).await.map_err(reject)?;
    Ok(warp::reply::json(&Message { message: "Deleted" }))
}

/// Responds with the recorded snapshot only.
pub async fn sync_location(id: String, service: LocationService) -> Result<impl Reply, Rejection> {
    let outcome = service.sync(&id).await.map_err(reject)?;
    Ok(warp::reply::json(&outcome.snapshot))
}

pub async fn location_forecast(
    id: String,
    service: LocationService,
) -> Result<impl Reply, Rejection> {
    let forecast = service.forecast(&id).await.map_err(reject)?;
    Ok(warp::reply::json(&forecast))
}

pub async fn location_snapshots(
    id: String,
    service: LocationService,
) -> Result<impl Reply, Rejection> {
    let snapshots = service.snapshots(&id).await.map_err(reject)?;
    Ok(warp::reply::json(&snapshots))
}

pub fn health() -> impl Reply {
    warp::reply::json(&Health {
        status: "ok",
        timestamp: Utc::now(),
    })
}
