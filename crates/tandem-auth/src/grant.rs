//! Token issuance.
//!
//! The full RFC 6749 grant-type decision logic belongs to an external
//! framework; this module defines that capability abstractly as
//! [`TokenGranter`] ("given a grant request, produce an access token or
//! fail") and provides [`OpaqueTokenGranter`], a reference implementation
//! that issues random opaque bearer tokens backed by the token store. It
//! covers the storage-visible behavior of the authorization-code,
//! refresh-token, client-credentials, and password grants; everything
//! subtler is the framework's problem, not the store's.

use std::sync::Arc;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::AuthResult;
use crate::config::TokenLifetimeConfig;
use crate::error::AuthError;
use crate::store::TokenStore;
use crate::types::{Authentication, BearerToken, UserDirectory};

/// A token grant request, as arriving at the token endpoint.
#[derive(Debug, Clone, Default)]
pub struct GrantRequest {
    /// The requested grant type.
    pub grant_type: String,

    /// The requesting client.
    pub client_id: String,

    /// Authorization code (`authorization_code` grant).
    pub code: Option<String>,

    /// Refresh token value (`refresh_token` grant).
    pub refresh_token: Option<String>,

    /// Resource owner user name (`password` grant).
    pub username: Option<String>,

    /// Resource owner password (`password` grant).
    pub password: Option<String>,

    /// Requested scopes, space-separated.
    pub scope: Option<String>,
}

/// The grant capability the storage core is built against.
#[async_trait]
pub trait TokenGranter: Send + Sync {
    /// Produces an access token for the request, or fails with a
    /// grant-specific error.
    async fn grant(&self, request: &GrantRequest) -> AuthResult<BearerToken>;
}

/// Issues random opaque bearer tokens persisted through [`TokenStore`].
pub struct OpaqueTokenGranter {
    store: Arc<TokenStore>,
    config: TokenLifetimeConfig,
    users: Option<Arc<dyn UserDirectory>>,
}

impl OpaqueTokenGranter {
    /// Creates a granter over the given store.
    pub fn new(store: Arc<TokenStore>, config: TokenLifetimeConfig) -> Self {
        Self {
            store,
            config,
            users: None,
        }
    }

    /// Enables the password grant against the given user directory.
    #[must_use]
    pub fn with_user_directory(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    async fn grant_authorization_code(&self, request: &GrantRequest) -> AuthResult<BearerToken> {
        let code = request
            .code
            .as_deref()
            .ok_or_else(|| AuthError::invalid_grant("missing authorization code"))?;

        // Single-use: the consume deletes the code, so a replayed request
        // lands here with None and fails.
        let authentication = self
            .store
            .consume_authorization_code(code)
            .await?
            .ok_or_else(|| {
                AuthError::invalid_grant("authorization code is invalid or already used")
            })?;

        self.issue(&authentication, true).await
    }

    async fn grant_refresh_token(&self, request: &GrantRequest) -> AuthResult<BearerToken> {
        let refresh_value = request
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthError::invalid_grant("missing refresh token"))?;

        let record = self
            .store
            .read_refresh_token(refresh_value)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("refresh token is not recognized"))?;

        // Invalidate the access tokens minted against this refresh token
        // before issuing their successor.
        self.store
            .remove_access_token_by_refresh_token(refresh_value)
            .await?;

        let mut token = self.issue_value(&record.authentication).await?;
        token.refresh_token = Some(refresh_value.to_string());
        self.store
            .store_access_token(&token, &record.authentication)
            .await?;
        Ok(token)
    }

    async fn grant_password(&self, request: &GrantRequest) -> AuthResult<BearerToken> {
        let users = self.users.as_ref().ok_or_else(|| {
            AuthError::unsupported_grant_type("password")
        })?;
        let username = request
            .username
            .as_deref()
            .ok_or_else(|| AuthError::invalid_grant("missing username"))?;
        let password = request
            .password
            .as_deref()
            .ok_or_else(|| AuthError::invalid_grant("missing password"))?;

        let user = users.verify_credentials(username, password).await?;

        let scope = request
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string);
        let authentication = Authentication::for_user(&request.client_id, scope, &user.username)
            .with_authorities(user.authorities);

        self.issue(&authentication, true).await
    }

    async fn grant_client_credentials(&self, request: &GrantRequest) -> AuthResult<BearerToken> {
        if request.client_id.is_empty() {
            return Err(AuthError::invalid_client("missing client_id"));
        }
        let scope = request
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string);
        let authentication = Authentication::client_only(&request.client_id, scope);

        // Client-only grants never carry a refresh token.
        self.issue(&authentication, false).await
    }

    async fn issue(
        &self,
        authentication: &Authentication,
        with_refresh: bool,
    ) -> AuthResult<BearerToken> {
        let mut token = self.issue_value(authentication).await?;
        if with_refresh && self.config.issue_refresh_tokens {
            token.refresh_token = Some(BearerToken::generate_value());
        }
        self.store.store_access_token(&token, authentication).await?;
        Ok(token)
    }

    async fn issue_value(&self, authentication: &Authentication) -> AuthResult<BearerToken> {
        let lifetime = Duration::try_from(self.config.access_token_lifetime)
            .map_err(|e| AuthError::configuration(format!("access token lifetime: {e}")))?;
        debug!(client_id = %authentication.client_id, "issuing access token");
        Ok(BearerToken::new(BearerToken::generate_value())
            .with_expires_at(OffsetDateTime::now_utc() + lifetime)
            .with_scope(authentication.scope.iter().cloned().collect::<Vec<_>>()))
    }
}

#[async_trait]
impl TokenGranter for OpaqueTokenGranter {
    async fn grant(&self, request: &GrantRequest) -> AuthResult<BearerToken> {
        match request.grant_type.as_str() {
            "authorization_code" => self.grant_authorization_code(request).await,
            "refresh_token" => self.grant_refresh_token(request).await,
            "client_credentials" => self.grant_client_credentials(request).await,
            "password" => self.grant_password(request).await,
            other => Err(AuthError::unsupported_grant_type(other)),
        }
    }
}
