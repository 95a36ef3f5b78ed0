//! Network geolocation client.
//!
//! [`HttpGeolocationClient`] asks a geolocation web service for the device's
//! position. The request/response shape follows the widely used
//! `geolocate` API:
//!
//! ```text
//! POST <endpoint>?key=<api_key>
//! {"considerIp": true}
//!
//! 200 {"location": {"lat": 1.2840, "lng": 103.8514}, "accuracy": 1200.0}
//! ```
//!
//! # Failure classification
//!
//! | Response                     | Kind                  |
//! |------------------------------|-----------------------|
//! | 401, 403                     | `permission_denied`   |
//! | 404, 429, 5xx                | `position_unavailable`|
//! | transport timeout            | `timeout`             |
//! | anything else, bad JSON      | `unknown`             |

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::LocationCapability;
use crate::tracking::error::TrackingError;
use crate::tracking::sample::Fix;

/// Default geolocation endpoint.
pub const DEFAULT_GEOLOCATION_URL: &str = "https://www.googleapis.com/geolocation/v1/geolocate";

/// Default HTTP timeout for one geolocation request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the geolocation client.
#[derive(Debug, Clone)]
pub struct GeolocationConfig {
    /// Service endpoint.
    pub endpoint: String,

    /// API key appended as the `key` query parameter, if any.
    pub api_key: Option<String>,

    /// Transport-level timeout.
    pub request_timeout: Duration,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOLOCATION_URL.to_string(),
            api_key: None,
            request_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeolocationRequest {
    consider_ip: bool,
}

#[derive(Debug, Deserialize)]
struct GeolocationResponse {
    location: LatLng,
    accuracy: f64,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Error body returned by the service on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// Geolocation client using direct HTTP requests.
///
/// Uses a reusable `reqwest::Client` with connection pooling and timeouts.
pub struct HttpGeolocationClient {
    http: reqwest::Client,
    config: GeolocationConfig,
}

impl HttpGeolocationClient {
    /// Create a new client.
    pub fn new(config: GeolocationConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { http, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

impl LocationCapability for HttpGeolocationClient {
    async fn read_current_position(&self) -> Result<Fix, TrackingError> {
        let mut request = self
            .http
            .post(&self.config.endpoint)
            .json(&GeolocationRequest { consider_ip: true });

        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorResponse>(&bytes)
                .map(|body| body.error.message)
                .unwrap_or_default();
            return Err(classify_response_status(status, &detail));
        }

        parse_fix(&bytes)
    }

    fn is_supported(&self) -> bool {
        !self.config.endpoint.trim().is_empty()
    }
}

/// Map a non-success HTTP status into the tracking error taxonomy.
pub fn classify_response_status(status: StatusCode, detail: &str) -> TrackingError {
    let message = if detail.is_empty() {
        format!("geolocation service returned {}", status)
    } else {
        format!("geolocation service returned {}: {}", status, detail)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TrackingError::permission_denied(message)
        }
        StatusCode::NOT_FOUND | StatusCode::TOO_MANY_REQUESTS => {
            TrackingError::position_unavailable(message)
        }
        s if s.is_server_error() => TrackingError::position_unavailable(message),
        _ => TrackingError::unknown(message),
    }
}

fn map_transport_error(e: reqwest::Error) -> TrackingError {
    if e.is_timeout() {
        TrackingError::timeout(format!("geolocation request timed out: {}", e))
    } else if e.is_connect() {
        TrackingError::position_unavailable(format!("geolocation service unreachable: {}", e))
    } else {
        TrackingError::unknown(e.to_string())
    }
}

fn parse_fix(bytes: &[u8]) -> Result<Fix, TrackingError> {
    let body: GeolocationResponse = serde_json::from_slice(bytes)
        .map_err(|e| TrackingError::unknown(format!("failed to parse response: {}", e)))?;

    tracing::trace!(
        lat = body.location.lat,
        lng = body.location.lng,
        accuracy_m = body.accuracy,
        "Geolocation response received"
    );

    Ok(Fix {
        latitude: body.location.lat,
        longitude: body.location.lng,
        accuracy_meters: body.accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::error::TrackingErrorKind;

    #[test]
    fn test_default_config() {
        let config = GeolocationConfig::default();
        assert_eq!(config.endpoint, DEFAULT_GEOLOCATION_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_client_creation() {
        let client = HttpGeolocationClient::new(GeolocationConfig::default()).unwrap();
        assert_eq!(client.endpoint(), DEFAULT_GEOLOCATION_URL);
        assert!(client.is_supported());
    }

    #[test]
    fn test_empty_endpoint_is_unsupported() {
        let config = GeolocationConfig {
            endpoint: "  ".to_string(),
            ..Default::default()
        };
        let client = HttpGeolocationClient::new(config).unwrap();
        assert!(!client.is_supported());
    }

    #[test]
    fn test_classify_permission_statuses() {
        let err = classify_response_status(StatusCode::FORBIDDEN, "keyInvalid");
        assert_eq!(err.kind(), TrackingErrorKind::PermissionDenied);
        assert!(err.message().contains("keyInvalid"));

        let err = classify_response_status(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.kind(), TrackingErrorKind::PermissionDenied);
    }

    #[test]
    fn test_classify_unavailable_statuses() {
        for status in [
            StatusCode::NOT_FOUND,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            let err = classify_response_status(status, "");
            assert_eq!(err.kind(), TrackingErrorKind::PositionUnavailable);
        }
    }

    #[test]
    fn test_classify_other_statuses_unknown() {
        let err = classify_response_status(StatusCode::BAD_REQUEST, "parseError");
        assert_eq!(err.kind(), TrackingErrorKind::Unknown);
        assert_eq!(
            err.message(),
            "geolocation service returned 400 Bad Request: parseError"
        );
    }

    #[test]
    fn test_parse_fix() {
        let json = br#"{"location": {"lat": 1.284, "lng": 103.8514}, "accuracy": 1200.5}"#;
        let fix = parse_fix(json).unwrap();
        assert_eq!(fix.latitude, 1.284);
        assert_eq!(fix.longitude, 103.8514);
        assert_eq!(fix.accuracy_meters, 1200.5);
    }

    #[test]
    fn test_parse_fix_rejects_garbage() {
        let err = parse_fix(b"<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), TrackingErrorKind::Unknown);
        assert!(err.message().starts_with("failed to parse response"));
    }

    #[test]
    fn test_error_body_deserialize() {
        let json = r#"{"error": {"code": 404, "message": "Not Found", "errors": [{"reason": "notFound"}]}}"#;
        let body: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.error.message, "Not Found");
    }
}
