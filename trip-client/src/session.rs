//! Authentication session.
//!
//! A [`Session`] is created once at start-up and handed to the API client.
//! It owns the bearer token and records when the backend has rejected it,
//! so the caller can send the user back to a login screen. The token can
//! optionally be persisted to a file between runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Errors reading or writing the persisted token.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to access token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default)]
struct SessionInner {
    token: RwLock<Option<String>>,
    login_required: AtomicBool,
    token_file: Option<PathBuf>,
}

/// Shared handle to the current authentication state.
///
/// Cloning is cheap; all clones see the same token.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create a session with no token and no persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an in-memory session holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                token: RwLock::new(Some(token.into())),
                ..SessionInner::default()
            }),
        }
    }

    /// Create a session backed by a token file, loading any saved token.
    ///
    /// A missing file means no token.
    pub async fn persisted(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();

        let token = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Some(contents.trim().to_string()).filter(|t| !t.is_empty()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => return Err(SessionError::Io { path, source }),
        };
        debug!(path = %path.display(), loaded = token.is_some(), "opened session");

        Ok(Self {
            inner: Arc::new(SessionInner {
                token: RwLock::new(token),
                login_required: AtomicBool::new(false),
                token_file: Some(path),
            }),
        })
    }

    /// The bearer token to send, if any.
    ///
    /// Tokens whose `exp` claim has passed are treated as absent.
    pub async fn token(&self) -> Option<String> {
        let token = self.inner.token.read().await.clone()?;
        match jwt_expiry(&token) {
            Some(exp) if exp <= Utc::now() => {
                debug!(%exp, "ignoring expired token");
                None
            }
            _ => Some(token),
        }
    }

    /// Store a new token, e.g. after logging in.
    pub async fn set_token(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();

        if let Some(path) = &self.inner.token_file {
            tokio::fs::write(path, &token)
                .await
                .map_err(|source| SessionError::Io {
                    path: path.clone(),
                    source,
                })?;
        }

        *self.inner.token.write().await = Some(token);
        self.inner.login_required.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Forget the token, e.g. on logout.
    pub async fn clear(&self) -> Result<(), SessionError> {
        *self.inner.token.write().await = None;

        if let Some(path) = &self.inner.token_file {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(SessionError::Io {
                        path: path.clone(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    /// Forget the token after the backend rejected it and ask for a login.
    pub async fn expire(&self) {
        info!("session rejected by backend, login required");
        if let Err(e) = self.clear().await {
            warn!(error = %e, "failed to remove stored token");
        }
        self.inner.login_required.store(true, Ordering::SeqCst);
    }

    /// Whether the user has to log in again.
    pub fn login_required(&self) -> bool {
        self.inner.login_required.load(Ordering::SeqCst)
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Expiry time of a JWT, if the token is one and carries an `exp` claim.
pub fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn jwt(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u1","exp":{exp}}}"#));
        format!("{header}.{payload}.c2lnbmF0dXJl")
    }

    #[test]
    fn reads_jwt_expiry() {
        let exp = jwt_expiry(&jwt(1_900_000_000)).unwrap();
        assert_eq!(exp.timestamp(), 1_900_000_000);

        assert_eq!(jwt_expiry("opaque-token"), None);
        assert_eq!(jwt_expiry("a.b.c.d"), None);
        assert_eq!(jwt_expiry("a.!!!.c"), None);
    }

    #[tokio::test]
    async fn expired_token_is_absent() {
        let past = (Utc::now() - Duration::hours(1)).timestamp();
        let session = Session::with_token(jwt(past));
        assert_eq!(session.token().await, None);

        let future = (Utc::now() + Duration::hours(1)).timestamp();
        let token = jwt(future);
        let session = Session::with_token(token.clone());
        assert_eq!(session.token().await, Some(token));
    }

    #[tokio::test]
    async fn opaque_tokens_are_kept() {
        let session = Session::with_token("abc123");
        assert_eq!(session.token().await.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn expire_clears_and_flags_login() {
        let session = Session::with_token("abc123");
        let shared = session.clone();

        shared.expire().await;
        assert_eq!(session.token().await, None);
        assert!(session.login_required());

        session.set_token("fresh").await.unwrap();
        assert!(!session.login_required());
        assert_eq!(shared.token().await.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn token_persists_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");

        let session = Session::persisted(&path).await.unwrap();
        assert_eq!(session.token().await, None);
        session.set_token("saved-token").await.unwrap();

        let reopened = Session::persisted(&path).await.unwrap();
        assert_eq!(reopened.token().await.as_deref(), Some("saved-token"));

        reopened.clear().await.unwrap();
        assert!(!path.exists());
        reopened.clear().await.unwrap();
    }
}
