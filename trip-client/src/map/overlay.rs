//! Map overlay for a plan: markers per spot and a route per day.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::domain::{ClockTime, GeoPoint, PlanId, PlanSpot, PlanSpotId, Spot, SpotCategory, SpotId};

use super::cache::{RouteCache, RouteCacheConfig};
use super::cluster::{Cluster, Viewport, cluster_points, viewport_for};
use super::osrm::{OsrmClient, RouteError};
use super::palette::{MarkerColor, MarkerStyle, RouteStyle, category_color};
use super::route::Route;

/// Source of route geometry for one day of a plan.
///
/// Implementations never fail; they fall back to a straight line.
pub trait RouteProvider: Send + Sync {
    fn route(
        &self,
        plan: Option<&PlanId>,
        day: u32,
        points: &[GeoPoint],
    ) -> impl Future<Output = Route> + Send;
}

/// Routes from the backend, then OSRM, then straight lines.
#[derive(Debug, Clone)]
pub struct Router {
    api: Option<ApiClient>,
    osrm: OsrmClient,
    cache: RouteCache,
}

impl Router {
    /// Create a router; without `api` the backend step is skipped.
    pub fn new(config: &ClientConfig, api: Option<ApiClient>) -> Result<Self, RouteError> {
        Ok(Self {
            api,
            osrm: OsrmClient::new(config)?,
            cache: RouteCache::new(&RouteCacheConfig::from(config)),
        })
    }

    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    async fn backend_route(&self, plan: &PlanId, day: u32, points: &[GeoPoint]) -> Option<Route> {
        let api = self.api.as_ref()?;
        match api.plan_route(plan, day).await {
            Ok(response) => {
                let route = Route::from_backend(response.route, points);
                if route.is_none() {
                    debug!(plan = %plan, day, "backend route has no totals");
                }
                route
            }
            Err(e) => {
                warn!(plan = %plan, day, error = %e, "backend route failed, trying OSRM");
                None
            }
        }
    }
}

impl RouteProvider for Router {
    async fn route(&self, plan: Option<&PlanId>, day: u32, points: &[GeoPoint]) -> Route {
        if let Some(cached) = self.cache.get(points).await {
            debug!(day, "route cache hit");
            return (*cached).clone();
        }

        let mut route = None;
        if let Some(plan) = plan {
            route = self.backend_route(plan, day, points).await;
        }

        if route.is_none() {
            match self.osrm.route(points).await {
                Ok(r) => route = Some(r),
                Err(e) => warn!(day, error = %e, "OSRM route failed, using straight lines"),
            }
        }

        match route {
            Some(route) => {
                self.cache.insert(points, Arc::new(route.clone())).await;
                route
            }
            None => Route::straight_line(points),
        }
    }
}

/// A plan spot placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanMarker {
    pub plan_spot_id: PlanSpotId,
    pub spot_id: SpotId,
    pub name: String,
    pub area: String,
    pub category: SpotCategory,
    pub day: u32,
    pub position: GeoPoint,
    pub start_time: Option<ClockTime>,
    pub note: Option<String>,
    pub must_visit: bool,
    pub style: MarkerStyle,
}

/// A catalogue spot placed on the map, coloured by category.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotMarker {
    pub spot_id: SpotId,
    pub name: String,
    pub position: GeoPoint,
    pub color: MarkerColor,
}

/// Markers for every catalogue spot that has coordinates.
pub fn spot_markers(spots: &[Spot]) -> Vec<SpotMarker> {
    spots
        .iter()
        .filter_map(|spot| {
            Some(SpotMarker {
                spot_id: spot.id.clone(),
                name: spot.name.clone(),
                position: spot.location?,
                color: category_color(spot.category),
            })
        })
        .collect()
}

/// The route of one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRoute {
    pub day: u32,
    pub route: Route,
    pub style: RouteStyle,
}

/// Which days to draw and which one is in focus.
#[derive(Debug, Clone, Default)]
pub struct OverlayOptions {
    pub selected_day: u32,
    /// Days to draw routes for; `None` draws all.
    pub visible_days: Option<BTreeSet<u32>>,
}

impl OverlayOptions {
    pub fn selected(day: u32) -> Self {
        Self {
            selected_day: day,
            visible_days: None,
        }
    }

    pub fn with_visible_days(mut self, days: impl IntoIterator<Item = u32>) -> Self {
        self.visible_days = Some(days.into_iter().collect());
        self
    }

    fn is_visible(&self, day: u32) -> bool {
        self.visible_days.as_ref().is_none_or(|days| days.contains(&day))
    }
}

/// Everything drawn on a plan's map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOverlay {
    pub selected_day: u32,
    /// Markers in plan order.
    pub markers: Vec<PlanMarker>,
    /// Routes with the selected day first, then by day.
    pub routes: Vec<DayRoute>,
    pub viewport: Viewport,
}

impl MapOverlay {
    /// Build the overlay for `spots`.
    ///
    /// `plan` enables backend routing; `area` centres the map when no spot
    /// has coordinates. Route fetches for all days run concurrently.
    pub async fn build<R: RouteProvider>(
        plan: Option<&PlanId>,
        area: &str,
        spots: &[PlanSpot],
        options: &OverlayOptions,
        provider: &R,
    ) -> Self {
        let markers = plan_markers(spots, options.selected_day);
        let positions: Vec<GeoPoint> = markers.iter().map(|m| m.position).collect();

        let days = route_days(spots, options);
        let fetches = days.iter().map(|(day, points)| async move {
            let route = provider.route(plan, *day, points).await;
            DayRoute {
                day: *day,
                route,
                style: RouteStyle::for_day(*day, options.selected_day),
            }
        });
        let routes = join_all(fetches).await;

        Self {
            selected_day: options.selected_day,
            markers,
            routes,
            viewport: viewport_for(&positions, area),
        }
    }

    /// Markers grouped for display at `zoom`.
    pub fn clusters(&self, zoom: u8) -> Vec<Cluster> {
        let positions: Vec<GeoPoint> = self.markers.iter().map(|m| m.position).collect();
        cluster_points(&positions, zoom)
    }

    pub fn route_for_day(&self, day: u32) -> Option<&DayRoute> {
        self.routes.iter().find(|r| r.day == day)
    }
}

/// Markers for every plan spot that has coordinates.
pub fn plan_markers(spots: &[PlanSpot], selected_day: u32) -> Vec<PlanMarker> {
    spots
        .iter()
        .filter_map(|ps| {
            Some(PlanMarker {
                plan_spot_id: ps.id.clone(),
                spot_id: ps.spot_id.clone(),
                name: ps.spot.name.clone(),
                area: ps.spot.area.clone(),
                category: ps.spot.category,
                day: ps.day,
                position: ps.spot.location?,
                start_time: ps.start_time,
                note: ps.note.clone(),
                must_visit: ps.is_must_visit,
                style: MarkerStyle::for_day(ps.day, selected_day),
            })
        })
        .collect()
}

/// Located points per visible day, selected day first.
///
/// Days with fewer than two located spots are left out.
fn route_days(spots: &[PlanSpot], options: &OverlayOptions) -> Vec<(u32, Vec<GeoPoint>)> {
    let mut by_day: BTreeMap<u32, Vec<GeoPoint>> = BTreeMap::new();
    for ps in spots {
        if let Some(location) = ps.spot.location {
            by_day.entry(ps.day).or_default().push(location);
        }
    }

    let mut days: Vec<(u32, Vec<GeoPoint>)> = by_day
        .into_iter()
        .filter(|(day, points)| options.is_visible(*day) && points.len() >= 2)
        .collect();
    days.sort_by_key(|(day, _)| (*day != options.selected_day, *day));
    days
}
