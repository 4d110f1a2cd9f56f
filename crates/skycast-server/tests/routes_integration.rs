//! Integration tests for the HTTP routes using warp's test harness.

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use skycast_services::{LocationClient, LocationService};
use skycast_weather::{CurrentConditions, Forecast, WeatherError, WeatherSource};
use warp::http::StatusCode;
use warp::{Filter, Reply};

/// Weather source that knows a single city.
struct OneCity;

fn rome() -> CurrentConditions {
    CurrentConditions {
        name: "Rome".into(),
        country: Some("IT".into()),
        lat: 41.8947,
        lon: 12.4839,
        temp: 19.6,
        humidity: 52,
        description: "few clouds".into(),
        icon: Some("02d".into()),
    }
}

#[async_trait]
impl WeatherSource for OneCity {
    async fn current_weather(&self, city: &str) -> Result<CurrentConditions, WeatherError> {
        if city.eq_ignore_ascii_case("rome") {
            Ok(rome())
        } else {
            Err(WeatherError::upstream("city not found"))
        }
    }

    async fn forecast(&self, city: &str) -> Result<Forecast, WeatherError> {
        let current = self.current_weather(city).await?;
        let list: Vec<Value> = (0..8)
            .map(|i| {
                json!({
                    "dt": 1_769_774_400 + i * 10_800,
                    "main": { "temp": current.temp, "feels_like": current.temp - 1.0, "humidity": current.humidity },
                    "weather": [{ "id": 801, "main": "Clouds", "description": current.description, "icon": "02d" }],
                    "wind": { "speed": 3.6, "deg": 200 },
                    "dt_txt": "2026-01-30 12:00:00"
                })
            })
            .collect();

        serde_json::from_value(json!({
            "cod": "200",
            "cnt": 8,
            "list": list,
            "city": { "id": 3169070, "name": current.name, "country": current.country, "timezone": 3600 }
        }))
        .map_err(|e| WeatherError::parse(e.to_string()))
    }
}

fn api(
    allowed_origin: Option<&str>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let store = LocationClient::open("sqlite::memory:").unwrap();
    let service = LocationService::new(store, Arc::new(OneCity));
    skycast_server::routes(service, allowed_origin)
}

fn body(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

async fn create_rome<F>(filter: &F) -> Value
where
    F: Filter + 'static,
    F::Extract: Reply + Send,
{
    let response = warp::test::request()
        .method("POST")
        .path("/api/locations")
        .json(&json!({ "city": "rome" }))
        .reply(filter)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body(&response)
}

#[tokio::test]
async fn test_health() {
    let filter = api(None);

    let response = warp::test::request().path("/health").reply(&filter).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body(&response);
    assert_eq!(json["status"], "ok");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_create_and_list() {
    let filter = api(None);

    let created = create_rome(&filter).await;
    assert_eq!(created["city"], "Rome");
    assert_eq!(created["country"], "IT");
    assert_eq!(created["isFavorite"], false);
    assert!(created["_id"].is_string());
    assert!(created["lastSynced"].is_string());

    let response = warp::test::request()
        .path("/api/locations")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response), json!([created]));
}

#[tokio::test]
async fn test_create_errors() {
    let filter = api(None);

    let response = warp::test::request()
        .method("POST")
        .path("/api/locations")
        .json(&json!({ "city": "  " }))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&response), json!({ "error": "City is required" }));

    let response = warp::test::request()
        .method("POST")
        .path("/api/locations")
        .json(&json!({ "city": "Atlantis" }))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&response), json!({ "error": "city not found" }));

    let response = warp::test::request()
        .method("POST")
        .path("/api/locations")
        .header("content-type", "application/json")
        .body("{ not json")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body(&response)["error"].is_string());

    let response = warp::test::request()
        .path("/api/locations")
        .reply(&filter)
        .await;
    assert_eq!(body(&response), json!([]));
}

#[tokio::test]
async fn test_get_update_delete() {
    let filter = api(None);
    let created = create_rome(&filter).await;
    let id = created["_id"].as_str().unwrap();

    let response = warp::test::request()
        .path(&format!("/api/locations/{}", id))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response), created);

    let response = warp::test::request()
        .method("PUT")
        .path(&format!("/api/locations/{}", id))
        .json(&json!({ "isFavorite": true, "_id": "ignored" }))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body(&response);
    assert_eq!(updated["_id"], id);
    assert_eq!(updated["isFavorite"], true);
    assert_eq!(updated["city"], "Rome");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let response = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/locations/{}", id))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response), json!({ "message": "Deleted" }));

    let response = warp::test::request()
        .path(&format!("/api/locations/{}", id))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&response), json!({ "error": "Location not found" }));
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let filter = api(None);

    for (method, suffix) in [
        ("PUT", ""),
        ("DELETE", ""),
        ("POST", "/sync"),
        ("GET", "/forecast"),
        ("GET", "/snapshots"),
    ] {
        let mut request = warp::test::request()
            .method(method)
            .path(&format!("/api/locations/missing{}", suffix));
        if method == "PUT" {
            request = request.json(&json!({ "isFavorite": true }));
        }

        let response = request.reply(&filter).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{} {}", method, suffix);
        assert_eq!(body(&response), json!({ "error": "Location not found" }));
    }
}

#[tokio::test]
async fn test_sync_and_snapshots() {
    let filter = api(None);
    let created = create_rome(&filter).await;
    let id = created["_id"].as_str().unwrap();

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/api/locations/{}/sync", id))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = body(&response);
    assert_eq!(snapshot["location"], id);
    assert_eq!(snapshot["temperature"], 19.6);
    assert_eq!(snapshot["humidity"], 52);
    assert_eq!(snapshot["description"], "few clouds");

    let response = warp::test::request()
        .path(&format!("/api/locations/{}", id))
        .reply(&filter)
        .await;
    let location = body(&response);
    assert_eq!(location["city"], "Rome");
    assert_eq!(location["_id"], id);

    let response = warp::test::request()
        .path(&format!("/api/locations/{}/snapshots", id))
        .reply(&filter)
        .await;
    assert_eq!(body(&response), json!([snapshot]));
}

#[tokio::test]
async fn test_forecast() {
    let filter = api(None);
    let created = create_rome(&filter).await;
    let id = created["_id"].as_str().unwrap();

    let response = warp::test::request()
        .path(&format!("/api/locations/{}/forecast", id))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let forecast = body(&response);
    assert_eq!(forecast["city"]["name"], "Rome");
    assert_eq!(forecast["city"]["country"], "IT");
    assert_eq!(forecast["city"]["timezone"], 3600);
    assert_eq!(forecast["city"]["id"], 3169070);
    assert_eq!(forecast["cnt"], 8);
    assert_eq!(forecast["list"].as_array().unwrap().len(), 8);

    // Samples keep the provider's layout
    let first = &forecast["list"][0];
    assert_eq!(first["dt"], 1_769_774_400);
    assert_eq!(first["main"]["temp"], 19.6);
    assert_eq!(first["main"]["humidity"], 52);
    assert_eq!(first["weather"][0]["description"], "few clouds");
    assert_eq!(first["weather"][0]["icon"], "02d");
    assert_eq!(first["wind"]["speed"], 3.6);
    assert_eq!(first["dt_txt"], "2026-01-30 12:00:00");
    assert!(first.get("temp").is_none());
}

#[tokio::test]
async fn test_unknown_route() {
    let filter = api(None);

    let response = warp::test::request().path("/api/nope").reply(&filter).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&response), json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_cors_any_origin() {
    let filter = api(None);

    let response = warp::test::request()
        .path("/health")
        .header("origin", "http://elsewhere.test")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://elsewhere.test"
    );
    assert!(response
        .headers()
        .get("access-control-allow-credentials")
        .is_none());
}

#[tokio::test]
async fn test_cors_configured_origin() {
    let filter = api(Some("http://localhost:3000/"));

    let response = warp::test::request()
        .method("OPTIONS")
        .path("/api/locations")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
    assert_eq!(
        response.headers()["access-control-allow-credentials"],
        "true"
    );

    let response = warp::test::request()
        .path("/health")
        .header("origin", "http://localhost:3000")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
    assert_eq!(
        response.headers()["access-control-allow-credentials"],
        "true"
    );

    let response = warp::test::request()
        .path("/health")
        .header("origin", "http://evil.test")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(
        body(&response),
        json!({ "error": "CORS request forbidden: origin not allowed" })
    );
}
