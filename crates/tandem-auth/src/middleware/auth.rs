//! Bearer token authentication extractors.
//!
//! Opaque bearer tokens are resolved through the token store: the token
//! value maps to its stored record, and the record's authentication blob
//! becomes the request's identity.
//!
//! # Example
//!
//! ```ignore
//! use tandem_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn handler(BearerAuth(ctx): BearerAuth) -> String {
//!     format!("hello {}", ctx.authentication.name().unwrap_or("client"))
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AuthError;
use crate::store::TokenStore;
use crate::types::{Authentication, BearerToken, Role};

/// State required for bearer token authentication.
#[derive(Clone)]
pub struct AuthState {
    /// Token store used to resolve bearer tokens.
    pub token_store: Arc<TokenStore>,
}

impl AuthState {
    /// Creates a new auth state.
    pub fn new(token_store: Arc<TokenStore>) -> Self {
        Self { token_store }
    }
}

/// The resolved identity behind a bearer token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The authentication stored with the token.
    pub authentication: Authentication,

    /// The token record's blob (expiry, scopes).
    pub token: BearerToken,
}

/// Extractor that validates a bearer token and yields an [`AuthContext`].
///
/// 1. Reads `Authorization: Bearer <token>`
/// 2. Resolves the token through the token store
/// 3. Rejects unknown and expired tokens
#[derive(Debug)]
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AuthError::unauthorized("missing Authorization header"))?;

        let token_value = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| AuthError::unauthorized("Authorization header is not a bearer token"))?
            .trim();

        let record = auth_state
            .token_store
            .read_access_token(token_value)
            .await?
            .ok_or_else(|| AuthError::unauthorized("access token is not recognized"))?;

        if record.token.is_expired() {
            return Err(AuthError::unauthorized("access token has expired"));
        }

        Ok(Self(AuthContext {
            authentication: record.authentication,
            token: record.token,
        }))
    }
}

/// Extractor requiring the `ROLE_CLIENT_ADMIN` authority.
///
/// The partner token endpoint is only open to the internal administration
/// client.
#[derive(Debug)]
pub struct ClientAdminAuth(pub AuthContext);

impl<S> FromRequestParts<S> for ClientAdminAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerAuth(ctx) = BearerAuth::from_request_parts(parts, state).await?;
        require_authority(&ctx, Role::ClientAdmin)?;
        Ok(Self(ctx))
    }
}

/// Extractor requiring the `ROLE_USER_ADMIN` authority.
pub struct UserAdminAuth(pub AuthContext);

impl<S> FromRequestParts<S> for UserAdminAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerAuth(ctx) = BearerAuth::from_request_parts(parts, state).await?;
        require_authority(&ctx, Role::UserAdmin)?;
        Ok(Self(ctx))
    }
}

fn require_authority(ctx: &AuthContext, role: Role) -> Result<(), AuthError> {
    if ctx.authentication.has_authority(role) {
        Ok(())
    } else {
        Err(AuthError::forbidden(format!("requires {role}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use axum::http::Request;
    use time::{Duration, OffsetDateTime};

    fn auth_state() -> AuthState {
        let storage = Arc::new(InMemoryStorage::new());
        AuthState::new(Arc::new(TokenStore::new(storage.clone(), storage)))
    }

    async fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/partner/token");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let state = auth_state();
        let mut parts = parts_with(None).await;
        let err = BearerAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let state = auth_state();
        let mut parts = parts_with(Some("Bearer ghost")).await;
        let err = BearerAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_valid_token_yields_context() {
        let state = auth_state();
        let auth = Authentication::for_user("web", [], "alice");
        let token = BearerToken::new("abc")
            .with_expires_at(OffsetDateTime::now_utc() + Duration::hours(1));
        state
            .token_store
            .store_access_token(&token, &auth)
            .await
            .unwrap();

        let mut parts = parts_with(Some("Bearer abc")).await;
        let BearerAuth(ctx) = BearerAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(ctx.authentication.name(), Some("alice"));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let state = auth_state();
        let auth = Authentication::for_user("web", [], "alice");
        let token = BearerToken::new("abc")
            .with_expires_at(OffsetDateTime::now_utc() - Duration::minutes(1));
        state
            .token_store
            .store_access_token(&token, &auth)
            .await
            .unwrap();

        let mut parts = parts_with(Some("Bearer abc")).await;
        let err = BearerAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_client_admin_gate() {
        let state = auth_state();

        let plain = Authentication::for_user("web", [], "alice");
        state
            .token_store
            .store_access_token(&BearerToken::new("plain"), &plain)
            .await
            .unwrap();

        let admin = Authentication::for_user("admin-cli", [], "svc")
            .with_authorities(vec![Role::ClientAdmin]);
        state
            .token_store
            .store_access_token(&BearerToken::new("admin"), &admin)
            .await
            .unwrap();

        let mut parts = parts_with(Some("Bearer plain")).await;
        let err = ClientAdminAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden { .. }));

        let mut parts = parts_with(Some("Bearer admin")).await;
        assert!(
            ClientAdminAuth::from_request_parts(&mut parts, &state)
                .await
                .is_ok()
        );
    }
}
