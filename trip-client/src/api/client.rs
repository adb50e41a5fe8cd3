//! Backend HTTP client.
//!
//! Every request goes through [`ApiClient::request`], which attaches the
//! session's bearer token, maps error statuses to [`ApiError`] and decodes
//! the JSON body.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::session::Session;

use super::error::ApiError;

/// Backend API client.
///
/// Cloning shares the connection pool and the session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    /// Create a client for the backend named in `config`.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let builder = self.http.get(self.url(path)).query(query);
        self.request(Method::GET, path, builder).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.http.post(self.url(path)).json(body);
        self.request(Method::POST, path, builder).await
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.http.put(self.url(path)).json(body);
        self.request(Method::PUT, path, builder).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode its JSON body.
    ///
    /// A 204 or empty body decodes as JSON `null`, so callers expecting no
    /// content use `()` or an `Option`.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        mut builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        if let Some(token) = self.session.token().await {
            builder = builder.bearer_auth(token);
        }

        debug!(%method, path, "sending request");
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(%method, path, "request unauthorized");
            self.session.expire().await;
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(status, &body);
            warn!(%method, path, status = status.as_u16(), %detail, "request failed");
            return Err(ApiError::Backend {
                status: status.as_u16(),
                detail,
            });
        }

        let body = if status == StatusCode::NO_CONTENT {
            String::new()
        } else {
            response.text().await?
        };
        let json = if body.trim().is_empty() { "null" } else { body.as_str() };

        serde_json::from_str(json).map_err(|e| ApiError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

/// Pull a readable message out of an error response body.
///
/// Uses `detail`, then `message`. Validation errors whose `detail` is a list
/// are joined by their `msg` fields. Bodies that are not JSON fall back to
/// the status line.
pub(crate) fn error_detail(status: StatusCode, body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        );
    };

    match (&value["detail"], &value["message"]) {
        (serde_json::Value::String(detail), _) if !detail.is_empty() => detail.clone(),
        (serde_json::Value::Array(items), _) if !items.is_empty() => items
            .iter()
            .map(|item| match &item["msg"] {
                serde_json::Value::String(msg) => msg.clone(),
                _ => item.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        (_, serde_json::Value::String(message)) if !message.is_empty() => message.clone(),
        _ => "An error occurred".to_string(),
    }
}
