//! Client configuration.
//!
//! [`ClientConfig`] covers where the backend and the public routing service
//! live and how long to wait for them. [`TimelineConfig`] holds the fixed
//! times and defaults the itinerary timeline uses.

use std::time::Duration;

use crate::domain::ClockTime;

/// Default backend base URL.
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default public routing service (OSRM demo server).
const DEFAULT_ROUTING_BASE_URL: &str = "https://router.project-osrm.org";

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Configuration for the backend and routing clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub api_base_url: String,
    /// Public routing service base URL
    pub routing_base_url: String,
    /// Bearer token to start the session with
    pub token: Option<String>,
    /// Backend request timeout in seconds
    pub timeout_secs: u64,
    /// Routing request timeout in seconds
    pub route_timeout_secs: u64,
    /// How long fetched routes stay cached
    pub route_cache_ttl: Duration,
    /// Maximum number of cached routes
    pub route_cache_capacity: u64,
    /// Interval between job status polls
    pub poll_interval: Duration,
    /// Quiet period before a search-as-you-type query is sent
    pub search_debounce: Duration,
}

impl ClientConfig {
    /// Create a config for the given backend URL.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: trim_base(api_base_url.into()),
            routing_base_url: DEFAULT_ROUTING_BASE_URL.to_string(),
            token: None,
            timeout_secs: 30,
            route_timeout_secs: 5,
            route_cache_ttl: Duration::from_secs(60 * 60),
            route_cache_capacity: 500,
            poll_interval: Duration::from_secs(2),
            search_debounce: Duration::from_millis(300),
        }
    }

    /// Read configuration from `TRIP_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config =
            Self::new(lookup("TRIP_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.into()));

        if let Some(url) = lookup("TRIP_ROUTING_URL") {
            config = config.with_routing_url(url);
        }
        if let Some(token) = lookup("TRIP_API_TOKEN").filter(|t| !t.is_empty()) {
            config = config.with_token(token);
        }
        if let Some(raw) = lookup("TRIP_TIMEOUT_SECS") {
            let secs = raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "TRIP_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            config = config.with_timeout(secs);
        }

        Ok(config)
    }

    /// Set the routing service URL.
    pub fn with_routing_url(mut self, url: impl Into<String>) -> Self {
        self.routing_base_url = trim_base(url.into());
        self
    }

    /// Set the initial bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set backend request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the job polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

fn trim_base(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Fixed times and fallbacks for the itinerary timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineConfig {
    /// Start time of the first spot of every day.
    pub day_anchor: ClockTime,

    /// Start time given to a newly added spot.
    pub added_spot_time: ClockTime,

    /// Start time for lodging added to an empty day.
    pub lodging_fallback_start: ClockTime,

    /// Travel time assumed when a spot has none (minutes).
    pub default_transport_minutes: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            day_anchor: ClockTime::from_minutes(9 * 60),
            added_spot_time: ClockTime::from_minutes(10 * 60),
            lodging_fallback_start: ClockTime::from_minutes(18 * 60),
            default_transport_minutes: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn config_defaults() {
        let config = ClientConfig::default();

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.routing_base_url, DEFAULT_ROUTING_BASE_URL);
        assert_eq!(config.token, None);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.route_timeout_secs, 5);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.search_debounce, Duration::from_millis(300));
    }

    #[test]
    fn config_builder() {
        let config = ClientConfig::new("http://api.test/")
            .with_routing_url("http://osrm.test//")
            .with_token("abc")
            .with_timeout(10)
            .with_poll_interval(Duration::from_millis(50));

        assert_eq!(config.api_base_url, "http://api.test");
        assert_eq!(config.routing_base_url, "http://osrm.test");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("TRIP_API_BASE_URL", "https://trips.example"),
            ("TRIP_API_TOKEN", "tok"),
            ("TRIP_TIMEOUT_SECS", "12"),
        ]
        .into_iter()
        .collect();

        let config =
            ClientConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_base_url, "https://trips.example");
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.routing_base_url, DEFAULT_ROUTING_BASE_URL);
    }

    #[test]
    fn config_rejects_bad_timeout() {
        let err = ClientConfig::from_lookup(|name| {
            (name == "TRIP_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "invalid value for TRIP_TIMEOUT_SECS: soon");
    }

    #[test]
    fn timeline_defaults() {
        let config = TimelineConfig::default();
        assert_eq!(config.day_anchor.to_string(), "09:00");
        assert_eq!(config.added_spot_time.to_string(), "10:00");
        assert_eq!(config.lodging_fallback_start.to_string(), "18:00");
        assert_eq!(config.default_transport_minutes, 20);
    }
}
