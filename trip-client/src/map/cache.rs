//! In-memory cache of resolved routes.
//!
//! Routes are keyed by their ordered coordinates rounded to six decimal
//! places, so the same spots in the same order share an entry regardless
//! of plan or day. Straight-line fallbacks are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::config::ClientConfig;
use crate::domain::GeoPoint;

use super::route::Route;

/// Coordinates in millionths of a degree.
type RouteKey = Vec<(i64, i64)>;

/// Configuration for the route cache.
#[derive(Debug, Clone)]
pub struct RouteCacheConfig {
    /// TTL for cached routes.
    pub ttl: Duration,

    /// Maximum number of cached routes.
    pub max_capacity: u64,
}

impl Default for RouteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 500,
        }
    }
}

impl From<&ClientConfig> for RouteCacheConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            ttl: config.route_cache_ttl,
            max_capacity: config.route_cache_capacity,
        }
    }
}

/// Cache for routes through a sequence of points.
#[derive(Clone)]
pub struct RouteCache {
    routes: MokaCache<RouteKey, Arc<Route>>,
}

impl RouteCache {
    pub fn new(config: &RouteCacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { routes }
    }

    fn key(points: &[GeoPoint]) -> RouteKey {
        points
            .iter()
            .map(|p| ((p.lat * 1e6).round() as i64, (p.lng * 1e6).round() as i64))
            .collect()
    }

    pub async fn get(&self, points: &[GeoPoint]) -> Option<Arc<Route>> {
        self.routes.get(&Self::key(points)).await
    }

    /// Store `route` for `points`; straight lines are ignored.
    pub async fn insert(&self, points: &[GeoPoint], route: Arc<Route>) {
        if route.is_straight_line() {
            return;
        }
        self.routes.insert(Self::key(points), route).await;
    }
}

impl std::fmt::Debug for RouteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteCache")
            .field("entries", &self.routes.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::route::RouteSource;

    fn points() -> Vec<GeoPoint> {
        vec![GeoPoint::new(35.0116, 135.7681), GeoPoint::new(34.9949, 135.7850)]
    }

    fn osrm_route() -> Arc<Route> {
        Arc::new(Route {
            path: points(),
            distance_km: Some(3.1),
            duration_minutes: Some(9.0),
            leg_minutes: vec![9],
            source: RouteSource::Osrm,
        })
    }

    #[tokio::test]
    async fn cached_route_is_returned() {
        let cache = RouteCache::new(&RouteCacheConfig::default());
        cache.insert(&points(), osrm_route()).await;

        let hit = cache.get(&points()).await.unwrap();
        assert_eq!(hit.distance_km, Some(3.1));

        // Noise below the key precision still hits.
        let nudged: Vec<GeoPoint> = points()
            .iter()
            .map(|p| GeoPoint::new(p.lat + 1e-9, p.lng))
            .collect();
        assert!(cache.get(&nudged).await.is_some());
    }

    #[tokio::test]
    async fn order_matters() {
        let cache = RouteCache::new(&RouteCacheConfig::default());
        cache.insert(&points(), osrm_route()).await;

        let reversed: Vec<GeoPoint> = points().into_iter().rev().collect();
        assert!(cache.get(&reversed).await.is_none());
    }

    #[tokio::test]
    async fn straight_lines_are_not_cached() {
        let cache = RouteCache::new(&RouteCacheConfig::default());
        cache
            .insert(&points(), Arc::new(Route::straight_line(&points())))
            .await;
        assert!(cache.get(&points()).await.is_none());
    }
}
