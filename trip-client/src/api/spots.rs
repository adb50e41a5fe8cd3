//! Spot catalogue endpoints and search-as-you-type.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::{Spot, SpotCategory, SpotId};
use crate::tasks::Debouncer;

use super::client::ApiClient;
use super::convert::convert_spot;
use super::error::ApiError;
use super::types::SpotDto;

/// Filters for listing spots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpotQuery {
    pub area: Option<String>,
    pub category: Option<SpotCategory>,
    pub keyword: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl SpotQuery {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    pub fn with_category(mut self, category: SpotCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_page(mut self, skip: u32, limit: u32) -> Self {
        self.skip = Some(skip);
        self.limit = Some(limit);
        self
    }

    /// Query string pairs; empty text filters are left out.
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(area) = self.area.as_deref().filter(|s| !s.is_empty()) {
            params.push(("area", area.to_string()));
        }
        if let Some(category) = self.category {
            params.push(("category", category.as_str().to_string()));
        }
        if let Some(keyword) = self.keyword.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("keyword", keyword.to_string()));
        }
        if let Some(skip) = self.skip {
            params.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

impl ApiClient {
    /// List catalogue spots matching `query`.
    pub async fn search_spots(&self, query: &SpotQuery) -> Result<Vec<Spot>, ApiError> {
        let spots: Vec<SpotDto> = self.get("/api/spots", &query.to_params()).await?;
        Ok(spots.into_iter().map(convert_spot).collect())
    }

    pub async fn get_spot(&self, id: &SpotId) -> Result<Spot, ApiError> {
        let path = format!("/api/spots/{}", urlencoding::encode(id.as_str()));
        let spot: SpotDto = self.get(&path, &[]).await?;
        Ok(convert_spot(spot))
    }
}

/// Latest state of a debounced search.
#[derive(Debug, Clone, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Ready(Arc<Vec<Spot>>),
    Failed(String),
}

/// Spot search that waits for typing to pause before querying.
///
/// Each new query supersedes the previous one, cancelling it if it is
/// still in flight.
pub struct SpotSearch {
    client: ApiClient,
    debouncer: Debouncer,
    state: watch::Sender<SearchState>,
}

impl SpotSearch {
    pub fn new(client: ApiClient, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            client,
            debouncer: Debouncer::new(debounce),
            state,
        }
    }

    /// Receiver that sees every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Schedule a search for `query`.
    pub fn query(&mut self, query: SpotQuery) {
        let client = self.client.clone();
        let state = self.state.clone();

        self.debouncer.call(async move {
            state.send_replace(SearchState::Loading);
            debug!(?query, "searching spots");
            let next = match client.search_spots(&query).await {
                Ok(spots) => SearchState::Ready(Arc::new(spots)),
                Err(e) => {
                    warn!(error = %e, "spot search failed");
                    SearchState::Failed(e.user_message())
                }
            };
            state.send_replace(next);
        });
    }

    /// Drop any pending search and reset to idle.
    pub fn clear(&mut self) {
        self.debouncer.cancel();
        self.state.send_replace(SearchState::Idle);
    }
}
