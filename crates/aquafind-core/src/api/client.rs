//! API client for the Overpass interpreter.
//!
//! This module provides the `OverpassClient` struct, which sends one query per
//! fetch and decodes the result into `Fountain` records.

use reqwest::{header, Client};
use tracing::{debug, info};

use crate::geo::Coordinate;
use crate::models::Fountain;

use super::overpass::{build_query, parse_response};
use super::FountainError;

// ============================================================================
// Constants
// ============================================================================

/// Public Overpass interpreter endpoint
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Search radius used when the caller does not pass one (5 km)
pub const DEFAULT_RADIUS_METERS: f64 = 5000.0;

/// Overpass asks clients to identify themselves.
const DEFAULT_USER_AGENT: &str = concat!("aquafind/", env!("CARGO_PKG_VERSION"));

/// Client for the Overpass API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    endpoint: String,
}

impl OverpassClient {
    /// Create a client for the public Overpass endpoint
    pub fn new() -> Result<Self, FountainError> {
        Self::with_endpoint(DEFAULT_OVERPASS_URL, DEFAULT_USER_AGENT)
    }

    /// Create a client for a specific interpreter URL.
    ///
    /// No request timeout is configured; the query itself carries a
    /// server-side timeout and the transport default applies otherwise.
    pub fn with_endpoint(endpoint: &str, user_agent: &str) -> Result<Self, FountainError> {
        let client = Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch fountains within the default 5 km radius of `center`.
    pub async fn fetch_fountains_default(
        &self,
        center: Coordinate,
    ) -> Result<Vec<Fountain>, FountainError> {
        self.fetch_fountains(center, DEFAULT_RADIUS_METERS).await
    }

    /// Fetch fountains within `radius_meters` of `center`.
    ///
    /// Issues exactly one request. Errors are returned as-is; there is no
    /// retry at this layer.
    pub async fn fetch_fountains(
        &self,
        center: Coordinate,
        radius_meters: f64,
    ) -> Result<Vec<Fountain>, FountainError> {
        if !center.is_valid() {
            return Err(FountainError::InvalidCoordinate {
                latitude: center.latitude,
                longitude: center.longitude,
            });
        }
        let radius_meters = if radius_meters > 0.0 {
            radius_meters
        } else {
            DEFAULT_RADIUS_METERS
        };

        let query = build_query(&center, radius_meters);
        debug!(endpoint = %self.endpoint, center = %center, radius_meters, "Sending Overpass query");

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FountainError::from_status(status, &body));
        }

        let body = response.bytes().await?;
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(FountainError::EmptyResponse);
        }

        let fountains = parse_response(&body)?;
        info!(count = fountains.len(), center = %center, radius_meters, "Fetched fountains");
        Ok(fountains)
    }
}
