//! OIDC userinfo client with a verification cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};
use url::Url;

use storeroom_core::UserId;

use super::error::IdentityError;
use crate::config::IdentityConfig;
use crate::models::CurrentUser;

const CACHE_CAPACITY: u64 = 10_000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Userinfo response; only `sub` is required.
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

/// Verifies bearer tokens against the identity provider.
///
/// Successful verifications are cached for the configured TTL, keyed by a
/// SHA-256 digest of the token so raw tokens are never held in memory
/// longer than the request.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    userinfo_url: Url,
    cache: Cache<String, CurrentUser>,
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("userinfo_url", &self.inner.userinfo_url.as_str())
            .finish_non_exhaustive()
    }
}

impl IdentityClient {
    /// Create a client for the configured provider.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Upstream` if the HTTP client cannot be built.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(IdentityClientInner {
                client,
                userinfo_url: config.userinfo_url.clone(),
                cache,
            }),
        })
    }

    /// Resolve a bearer token to the user it was issued to.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidToken` if the provider rejects the
    /// token, `IdentityError::Upstream` if it cannot be asked.
    #[instrument(skip_all)]
    pub async fn verify(&self, token: &str) -> Result<CurrentUser, IdentityError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentityError::InvalidToken);
        }

        let key = token_digest(token);
        if let Some(user) = self.inner.cache.get(&key).await {
            debug!(user_id = %user.id, "identity cache hit");
            return Ok(user);
        }

        let user = self.fetch_userinfo(token).await?;
        self.inner.cache.insert(key, user.clone()).await;
        Ok(user)
    }

    async fn fetch_userinfo(&self, token: &str) -> Result<CurrentUser, IdentityError> {
        let response = self
            .inner
            .client
            .get(self.inner.userinfo_url.clone())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            debug!(%status, "identity provider rejected token");
            return Err(IdentityError::InvalidToken);
        }
        if !status.is_success() {
            warn!(%status, "identity provider returned an error");
            return Err(IdentityError::Upstream(format!("userinfo returned {status}")));
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| IdentityError::Upstream(format!("invalid userinfo body: {e}")))?;

        if info.sub.trim().is_empty() {
            return Err(IdentityError::Upstream("userinfo without subject".to_string()));
        }

        Ok(CurrentUser {
            id: UserId::new(info.sub),
            email: info.email,
            name: info.name,
        })
    }
}

fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::get};
    use serde_json::json;

    use super::*;

    async fn userinfo(headers: HeaderMap) -> Result<Json<serde_json::Value>, StatusCode> {
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some("Bearer good") => Ok(Json(json!({"sub": "user_1", "email": "a@b.test"}))),
            Some("Bearer broken") => Err(StatusCode::INTERNAL_SERVER_ERROR),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }

    async fn client() -> IdentityClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().route("/userinfo", get(userinfo)))
                .await
                .unwrap();
        });
        IdentityClient::new(&IdentityConfig {
            userinfo_url: Url::parse(&format!("http://{addr}/userinfo")).unwrap(),
            cache_ttl: Duration::from_secs(60),
        })
        .unwrap()
    }

    #[test]
    fn test_token_digest_is_stable_hex() {
        let digest = token_digest("abc");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, token_digest("abc"));
        assert_ne!(digest, token_digest("abd"));
    }

    #[tokio::test]
    async fn test_verify_maps_provider_responses() {
        let client = client().await;

        let user = client.verify("good").await.unwrap();
        assert_eq!(user.id.as_str(), "user_1");
        assert_eq!(user.email.as_deref(), Some("a@b.test"));

        assert!(matches!(
            client.verify("nope").await,
            Err(IdentityError::InvalidToken)
        ));
        assert!(matches!(
            client.verify("broken").await,
            Err(IdentityError::Upstream(_))
        ));
        assert!(matches!(
            client.verify("  ").await,
            Err(IdentityError::InvalidToken)
        ));
    }
}
