//! Points of interest.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::{SpotCategory, SpotId, Tag};

/// Stay duration assumed when a spot does not specify one.
pub const DEFAULT_STAY_MINUTES: u32 = 60;

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// A point of interest as embedded in plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: SpotId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub area: String,
    #[serde(default = "fallback_category", deserialize_with = "lenient_category")]
    pub category: SpotCategory,
    #[serde(default = "default_stay", alias = "duration_minutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Spot {
    /// Create a spot with default descriptive fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: SpotCategory) -> Self {
        Self {
            id: SpotId::new(id),
            name: name.into(),
            description: String::new(),
            area: String::new(),
            category,
            duration_minutes: DEFAULT_STAY_MINUTES,
            rating: 0.0,
            image: String::new(),
            price: None,
            location: None,
            tags: Vec::new(),
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some(GeoPoint::new(lat, lng));
        self
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    pub fn is_lodging(&self) -> bool {
        self.category.is_lodging()
    }
}

fn fallback_category() -> SpotCategory {
    SpotCategory::FALLBACK
}

fn default_stay() -> u32 {
    DEFAULT_STAY_MINUTES
}

/// Unknown or null categories decode as the fallback category.
fn lenient_category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SpotCategory, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw {
        None => SpotCategory::FALLBACK,
        Some(name) => name.parse().unwrap_or_else(|_| {
            warn!(category = %name, "unknown spot category, using fallback");
            SpotCategory::FALLBACK
        }),
    })
}
