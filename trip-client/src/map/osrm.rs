//! Client for the public OSRM routing service.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::GeoPoint;

use super::route::{Route, RouteSource};

/// Errors from the routing service.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// A route needs at least two points
    #[error("need at least two points for a route, got {0}")]
    TooFewPoints(usize),

    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with an error status
    #[error("routing service returned status {0}")]
    Status(u16),

    /// Service answered but found no route
    #[error("no route found ({0})")]
    NoRoute(String),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json { message: String, body: String },
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

/// GeoJSON line string; coordinates are `[lng, lat]`.
#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    /// Metres
    #[serde(default)]
    distance: f64,
    /// Seconds
    #[serde(default)]
    duration: f64,
}

/// OSRM driving route client.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    http: reqwest::Client,
    base_url: String,
}

impl OsrmClient {
    pub fn new(config: &ClientConfig) -> Result<Self, RouteError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.route_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.routing_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Driving route visiting `points` in order.
    pub async fn route(&self, points: &[GeoPoint]) -> Result<Route, RouteError> {
        if points.len() < 2 {
            return Err(RouteError::TooFewPoints(points.len()));
        }

        let coords = points
            .iter()
            .map(|p| format!("{},{}", p.lng, p.lat))
            .collect::<Vec<_>>()
            .join(";");
        let url = format!("{}/route/v1/driving/{coords}", self.base_url);

        debug!(points = points.len(), "requesting OSRM route");

        let response = self
            .http
            .get(&url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RouteError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: OsrmResponse = serde_json::from_str(&body).map_err(|e| RouteError::Json {
            message: e.to_string(),
            body: body.chars().take(500).collect(),
        })?;

        convert_route(parsed)
    }
}

fn convert_route(response: OsrmResponse) -> Result<Route, RouteError> {
    if response.code != "Ok" {
        return Err(RouteError::NoRoute(response.code));
    }
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| RouteError::NoRoute("empty route list".to_string()))?;

    let path = route
        .geometry
        .coordinates
        .iter()
        .map(|[lng, lat]| GeoPoint::new(*lat, *lng))
        .collect();

    let (distance_km, duration_minutes) = if route.legs.is_empty() {
        (None, None)
    } else {
        let metres: f64 = route.legs.iter().map(|l| l.distance).sum();
        let seconds: f64 = route.legs.iter().map(|l| l.duration).sum();
        (Some(metres / 1000.0), Some(seconds / 60.0))
    };

    let leg_minutes = route
        .legs
        .iter()
        .map(|l| (l.duration / 60.0).round().max(0.0) as u32)
        .collect();

    Ok(Route {
        path,
        distance_km,
        duration_minutes,
        leg_minutes,
        source: RouteSource::Osrm,
    })
}
