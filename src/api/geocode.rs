use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::time::Duration;

/// Default geocoding endpoint (Google Maps Geocoding API)
pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const USER_AGENT: &str = "compmap/0.1.0 (https://github.com/compmap/compmap)";

/// A resolved venue position in WGS84
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeCandidate>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeCandidate {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

/// Client for the key-authenticated geocoding service.
///
/// One synchronous request per lookup; no retries and no caching. The
/// underlying HTTP client carries a request timeout so a dead connection
/// cannot stall a run forever.
pub struct GeocodeClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl GeocodeClient {
    /// Create a client for the given endpoint and credential.
    ///
    /// # Arguments
    /// * `endpoint` - Geocoding service URL (see [`DEFAULT_ENDPOINT`])
    /// * `api_key` - Service credential; must be non-empty
    /// * `timeout` - Per-request timeout
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> Result<Self> {
        if api_key.is_empty() {
            bail!(
                "Geocoding API key is empty; pass --api-key, set GEOCODE_API_KEY, \
                 or put api_key in compmap.toml"
            );
        }

        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            endpoint,
            api_key,
        })
    }

    /// Resolve a free-text venue name to coordinates.
    ///
    /// # Returns
    /// * `Ok(Some(coords))` - First candidate returned by the service
    /// * `Ok(None)` - The service knows no match for the query
    /// * `Err` - Transport failure, or the service rejected the request
    ///   (bad credential, quota exhausted)
    pub fn lookup(&self, query: &str) -> Result<Option<Coordinates>> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("address", query), ("key", self.api_key.as_str())])
            .send()
            .context(format!("Geocoding request failed for {:?}", query))?;

        if !response.status().is_success() {
            bail!(
                "Geocoding service returned error status: {}",
                response.status()
            );
        }

        let body: GeocodeResponse = response
            .json()
            .context("Failed to parse geocoding JSON response")?;

        first_candidate(body)
    }
}

/// Extract the first candidate's coordinates from a service response.
///
/// `ZERO_RESULTS` degrades to `None`; every other non-OK status is a hard
/// error carrying the service's message.
fn first_candidate(response: GeocodeResponse) -> Result<Option<Coordinates>> {
    match response.status.as_str() {
        "OK" => {
            let candidate = response
                .results
                .into_iter()
                .next()
                .ok_or_else(|| anyhow::anyhow!("Geocoding response has status OK but no results"))?;
            let location = candidate.geometry.location;
            Ok(Some(Coordinates {
                lat: location.lat,
                lng: location.lng,
            }))
        }
        "ZERO_RESULTS" => Ok(None),
        status => {
            let detail = response
                .error_message
                .map(|msg| format!(": {}", msg))
                .unwrap_or_default();
            bail!("Geocoding service rejected the request ({}){}", status, detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geocode_response() {
        // Trimmed-down response from the Geocoding API
        let json = r#"{
            "status": "OK",
            "results": [
                {"geometry": {"location": {"lat": 48.9244, "lng": 2.3601}}},
                {"geometry": {"location": {"lat": 48.8566, "lng": 2.3522}}}
            ]
        }"#;
        let response: GeocodeResponse = serde_json::from_str(json).unwrap();

        let coords = first_candidate(response).unwrap().unwrap();
        assert_eq!(coords.lat, 48.9244);
        assert_eq!(coords.lng, 2.3601);
    }

    #[test]
    fn test_zero_results_is_none() {
        let json = r#"{"status": "ZERO_RESULTS", "results": []}"#;
        let response: GeocodeResponse = serde_json::from_str(json).unwrap();

        assert_eq!(first_candidate(response).unwrap(), None);
    }

    #[test]
    fn test_request_denied_is_an_error() {
        let json = r#"{
            "status": "REQUEST_DENIED",
            "results": [],
            "error_message": "The provided API key is invalid."
        }"#;
        let response: GeocodeResponse = serde_json::from_str(json).unwrap();

        let err = first_candidate(response).unwrap_err();
        assert!(err.to_string().contains("REQUEST_DENIED"));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let result = GeocodeClient::new(
            DEFAULT_ENDPOINT.to_string(),
            String::new(),
            Duration::from_secs(30),
        );
        assert!(result.is_err());
    }
}
