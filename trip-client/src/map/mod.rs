//! Map overlay model.
//!
//! Plan spots become markers coloured by day, each day with at least two
//! located spots gets a route, and markers can be clustered for the
//! current zoom. Routes come from the backend when possible, otherwise from
//! the public OSRM service, otherwise straight lines.

mod cache;
mod cluster;
mod osrm;
mod overlay;
mod palette;
mod route;

pub use cache::{RouteCache, RouteCacheConfig};
pub use cluster::{
    Bounds, CLUSTER_RADIUS_PX, Cluster, DEFAULT_CENTER, DEFAULT_ZOOM, DISABLE_CLUSTERING_AT_ZOOM,
    FIT_MAX_ZOOM, Viewport, cluster_points, viewport_for,
};
pub use osrm::{OsrmClient, RouteError};
pub use overlay::{
    DayRoute, MapOverlay, OverlayOptions, PlanMarker, RouteProvider, Router, SpotMarker,
    plan_markers, spot_markers,
};
pub use palette::{DAY_COLORS, MarkerColor, MarkerStyle, RouteStyle, category_color, day_color};
pub use route::{Route, RouteSource};
