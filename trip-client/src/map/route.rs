//! Resolved route geometry.

use crate::api::RouteInfo;
use crate::domain::GeoPoint;

/// Where a route's geometry came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSource {
    /// Computed by the backend; carries the backend's own source tag.
    Backend(String),
    /// Fetched from the public routing service.
    Osrm,
    /// Straight segments between the spots.
    StraightLine,
}

/// A route through one day's spots.
///
/// Distance and duration are for display only.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub path: Vec<GeoPoint>,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<f64>,
    /// Travel minutes between consecutive spots, when the source reports legs.
    pub leg_minutes: Vec<u32>,
    pub source: RouteSource,
}

impl Route {
    /// Straight segments through `points`.
    pub fn straight_line(points: &[GeoPoint]) -> Self {
        Self {
            path: points.to_vec(),
            distance_km: None,
            duration_minutes: None,
            leg_minutes: Vec::new(),
            source: RouteSource::StraightLine,
        }
    }

    /// Route from a backend response, or `None` if it carries no totals.
    ///
    /// Backend geometry is already `[lat, lng]`. A response without
    /// geometry keeps its totals and is drawn through `points`.
    pub fn from_backend(info: RouteInfo, points: &[GeoPoint]) -> Option<Self> {
        if info.distance_km <= 0.0 && info.duration_minutes <= 0.0 {
            return None;
        }

        let path = if info.geometry.is_empty() {
            points.to_vec()
        } else {
            info.geometry
                .iter()
                .map(|[lat, lng]| GeoPoint::new(*lat, *lng))
                .collect()
        };

        Some(Self {
            path,
            distance_km: Some(info.distance_km),
            duration_minutes: Some(info.duration_minutes),
            leg_minutes: Vec::new(),
            source: RouteSource::Backend(info.source),
        })
    }

    pub fn is_straight_line(&self) -> bool {
        self.source == RouteSource::StraightLine
    }

    /// Short label for how the route is travelled.
    pub fn travel_label(&self) -> Option<&'static str> {
        match &self.source {
            RouteSource::Osrm => Some("car"),
            RouteSource::Backend(source) if source == "osrm" => Some("car"),
            RouteSource::Backend(_) => Some("train"),
            RouteSource::StraightLine => None,
        }
    }
}
