//! JSON error envelope and rejection recovery.
//!
//! Every failure leaves the server as `{"error": "<message>"}` with a status
//! derived from the service error kind.

use std::convert::Infallible;

use serde::Serialize;
use skycast_services::ServiceError;
use warp::cors::CorsForbidden;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{MethodNotAllowed, PayloadTooLarge, Reject, UnsupportedMediaType};
use warp::reply::Response;
use warp::{Rejection, Reply};

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An error on its way to becoming an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl Reject for ApiError {}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn to_response(&self) -> Response {
        let body = warp::reply::json(&ErrorBody {
            error: self.message.clone(),
        });
        warp::reply::with_status(body, self.status).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let status = match &e {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Weather(inner) => {
                tracing::warn!("Weather lookup failed: {:?}", inner);
                StatusCode::BAD_REQUEST
            }
            ServiceError::Store(inner) => {
                tracing::error!("Store failure: {:?}", inner);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

/// Reject a request with a service failure.
pub fn reject(e: ServiceError) -> Rejection {
    warp::reject::custom(ApiError::from(e))
}

/// Turn any rejection into an error envelope.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let error = if let Some(api) = err.find::<ApiError>() {
        api.clone()
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        tracing::debug!("Rejected request body: {}", e);
        ApiError::bad_request("Invalid JSON body")
    } else if err.find::<UnsupportedMediaType>().is_some() {
        ApiError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected application/json",
        )
    } else if err.find::<PayloadTooLarge>().is_some() {
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    } else if err.is_not_found() {
        ApiError::new(StatusCode::NOT_FOUND, "Not found")
    } else if err.find::<MethodNotAllowed>().is_some() {
        ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else if let Some(e) = err.find::<CorsForbidden>() {
        tracing::debug!("Rejected cross-origin request: {}", e);
        ApiError::new(StatusCode::FORBIDDEN, e.to_string())
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        ApiError::internal()
    };

    Ok(error.to_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_services::StoreError;
    use skycast_weather::WeatherError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                ServiceError::Validation("City is required".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Weather(WeatherError::upstream("city not found")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Store(StoreError::UnsupportedUrl("ftp://x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn test_upstream_message_passes_through() {
        let error = ApiError::from(ServiceError::Weather(WeatherError::upstream(
            "city not found",
        )));
        assert_eq!(error.message(), "city not found");

        let error = ApiError::from(ServiceError::NotFound("abc".into()));
        assert_eq!(error.message(), "Location not found");
    }
}
