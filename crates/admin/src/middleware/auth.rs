//! Authentication extractors for the console API.
//!
//! Callers present an identity-provider access token as
//! `Authorization: Bearer <token>`. The token is verified on every request
//! (cached in [`IdentityClient`](crate::identity::IdentityClient)).

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use sqlx::PgPool;
use tracing::{debug, warn};

use storeroom_core::StoreId;

use crate::db::StoreRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, Store};
use crate::state::AppState;

const UNAUTHENTICATED: &str = "Unauthenticated";

/// Extractor that requires a verified user.
///
/// Rejects with 401 when the token is missing or refused, 502 when the
/// identity provider cannot be reached.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> String {
///     format!("Hello, {}!", user.id)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized(UNAUTHENTICATED.to_string()))?;

        let user = state.identity().verify(token).await?;
        set_sentry_user(&user.id, user.email.as_deref());
        Ok(Self(user))
    }
}

/// Extractor for public routes that also serve signed-in owners.
///
/// Never rejects: a missing, refused or unverifiable token all yield `None`.
pub struct OptionalUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(Self(None));
        };

        match state.identity().verify(token).await {
            Ok(user) => {
                set_sentry_user(&user.id, user.email.as_deref());
                Ok(Self(Some(user)))
            }
            Err(e) => {
                debug!(error = %e, "ignoring unverified token on public route");
                Ok(Self(None))
            }
        }
    }
}

/// The token from an `Authorization: Bearer` header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Load a store and check that `user` owns it.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the store does not exist and
/// `AppError::Forbidden` if another user owns it.
pub async fn require_store_owner(
    pool: &PgPool,
    store_id: StoreId,
    user: &CurrentUser,
) -> Result<Store, AppError> {
    let store = StoreRepository::new(pool)
        .get(store_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))?;

    if !store.is_owned_by(&user.id) {
        warn!(%store_id, user_id = %user.id, "store access denied");
        return Err(AppError::Forbidden("Unauthorized action".to_string()));
    }

    Ok(store)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer  xyz ")), Some("xyz"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
