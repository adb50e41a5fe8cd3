//! Marker clustering and viewport fitting.
//!
//! Clustering works in Web Mercator pixel space at the current zoom, so the
//! same markers merge when zoomed out and separate when zoomed in.

use std::f64::consts::PI;

use crate::domain::GeoPoint;

/// Markers closer than this many pixels are merged.
pub const CLUSTER_RADIUS_PX: f64 = 50.0;

/// At this zoom and above every marker is shown on its own.
pub const DISABLE_CLUSTERING_AT_ZOOM: u8 = 16;

/// Initial view when nothing has been placed on the map (Tokyo).
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: 35.6895,
    lng: 139.6917,
};

pub const DEFAULT_ZOOM: u8 = 13;

/// Closest zoom used when fitting the view to markers.
pub const FIT_MAX_ZOOM: u8 = 15;

/// Zoom used when centring on an area without markers.
const AREA_ZOOM: u8 = 12;

const TILE_SIZE: f64 = 256.0;

/// Web Mercator latitude limit.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Project a coordinate to world pixel space at `zoom`.
fn project(point: &GeoPoint, zoom: u8) -> (f64, f64) {
    let scale = TILE_SIZE * f64::from(1u32 << zoom.min(24));
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();

    let x = (point.lng + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
    (x, y)
}

/// A group of nearby markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Mean position of the members.
    pub center: GeoPoint,
    /// Indices into the clustered point list, in input order.
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }
}

/// Greedily cluster `points` for display at `zoom`.
///
/// Each unassigned point in input order seeds a cluster that absorbs every
/// other unassigned point within [`CLUSTER_RADIUS_PX`] of the seed.
pub fn cluster_points(points: &[GeoPoint], zoom: u8) -> Vec<Cluster> {
    if zoom >= DISABLE_CLUSTERING_AT_ZOOM {
        return points
            .iter()
            .enumerate()
            .map(|(i, p)| Cluster {
                center: *p,
                members: vec![i],
            })
            .collect();
    }

    let projected: Vec<(f64, f64)> = points.iter().map(|p| project(p, zoom)).collect();
    let mut assigned = vec![false; points.len()];
    let mut clusters = Vec::new();

    for seed in 0..points.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let (sx, sy) = projected[seed];
        let mut members = vec![seed];

        for other in (seed + 1)..points.len() {
            if assigned[other] {
                continue;
            }
            let (ox, oy) = projected[other];
            if (ox - sx).hypot(oy - sy) <= CLUSTER_RADIUS_PX {
                assigned[other] = true;
                members.push(other);
            }
        }

        let n = members.len() as f64;
        let center = GeoPoint::new(
            members.iter().map(|&i| points[i].lat).sum::<f64>() / n,
            members.iter().map(|&i| points[i].lng).sum::<f64>() / n,
        );
        clusters.push(Cluster { center, members });
    }

    clusters
}

/// Axis-aligned geographic bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl Bounds {
    /// Smallest bounds containing every point, or `None` for no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        let mut bounds = Bounds {
            south_west: first,
            north_east: first,
        };
        for point in points {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: &GeoPoint) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }
}

/// Initial camera placement for a map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    /// Fit these bounds, zooming in no further than [`FIT_MAX_ZOOM`].
    Fit(Bounds),
    Center { center: GeoPoint, zoom: u8 },
}

/// Known regions used to centre a map whose plan has no located spots.
const AREA_CENTERS: &[(&[&str], GeoPoint)] = &[
    (&["京都", "Kyoto"], GeoPoint { lat: 35.0116, lng: 135.7681 }),
    (&["大阪", "Osaka"], GeoPoint { lat: 34.6937, lng: 135.5023 }),
    (&["鹿児島", "Kagoshima"], GeoPoint { lat: 31.5966, lng: 130.5571 }),
    (
        &["北海道", "札幌", "Hokkaido", "Sapporo"],
        GeoPoint { lat: 43.0618, lng: 141.3545 },
    ),
    (&["沖縄", "Okinawa"], GeoPoint { lat: 26.2124, lng: 127.6809 }),
];

/// Viewport for a set of markers, falling back to the plan's area.
pub fn viewport_for(points: &[GeoPoint], area: &str) -> Viewport {
    if let Some(bounds) = Bounds::from_points(points) {
        return Viewport::Fit(bounds);
    }

    let center = AREA_CENTERS
        .iter()
        .find(|(names, _)| names.iter().any(|name| area.contains(name)))
        .map(|(_, center)| *center)
        .unwrap_or(DEFAULT_CENTER);

    Viewport::Center {
        center,
        zoom: AREA_ZOOM,
    }
}
