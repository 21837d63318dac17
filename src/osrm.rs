//! OSRM HTTP adapter for per-day route costs.

use serde::Deserialize;
use tracing::debug;

use crate::cost::RouteCostProvider;
use crate::error::ProviderError;
use crate::model::{LatLng, RouteLeg, TransportMode};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

fn profile(mode: TransportMode) -> &'static str {
    match mode {
        TransportMode::Car | TransportMode::PublicTransport => "car",
        TransportMode::Walking => "foot",
    }
}

impl RouteCostProvider for OsrmClient {
    fn route_legs(
        &self,
        waypoints: &[LatLng],
        mode: TransportMode,
    ) -> Result<Vec<RouteLeg>, ProviderError> {
        if waypoints.len() < 2 {
            return Ok(Vec::new());
        }

        let coords = waypoints
            .iter()
            .map(|(lat, lng)| format!("{:.6},{:.6}", lng, lat))
            .collect::<Vec<_>>()
            .join(";");

        let url = format!(
            "{}/route/v1/{}/{}?overview=false&steps=false",
            self.config.base_url,
            profile(mode),
            coords
        );
        debug!(waypoints = waypoints.len(), %url, "requesting route");

        let response = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .json::<OsrmRouteResponse>()?;

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or(ProviderError::NoRoute)?;

        let legs: Vec<RouteLeg> = route
            .legs
            .iter()
            .map(|leg| RouteLeg {
                distance_km: leg.distance / 1000.0,
                duration_min: leg.duration / 60.0,
            })
            .collect();

        if legs.len() != waypoints.len() - 1 {
            return Err(ProviderError::LegCountMismatch {
                got: legs.len(),
                expected: waypoints.len() - 1,
            });
        }
        Ok(legs)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
}
