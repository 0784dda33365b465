//! Token endpoint.
//!
//! `POST /oauth/token` with an `application/x-www-form-urlencoded` body.
//! The endpoint delegates to the configured [`TokenGranter`]; the grant
//! decision logic lives behind that trait, not here.

use std::sync::Arc;

use axum::Form;
use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::error::AuthError;
use crate::grant::{GrantRequest, TokenGranter};

use super::TokenResponseBody;

/// State for the token endpoint.
#[derive(Clone)]
pub struct TokenEndpointState {
    /// The grant capability.
    pub granter: Arc<dyn TokenGranter>,
}

impl TokenEndpointState {
    /// Creates the endpoint state.
    pub fn new(granter: Arc<dyn TokenGranter>) -> Self {
        Self { granter }
    }
}

/// Form body of a token request.
#[derive(Debug, Deserialize)]
pub struct TokenRequestForm {
    /// The requested grant type.
    pub grant_type: String,

    /// The requesting client.
    #[serde(default)]
    pub client_id: String,

    /// Authorization code (`authorization_code` grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Refresh token (`refresh_token` grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Resource owner user name (`password` grant).
    #[serde(default)]
    pub username: Option<String>,

    /// Resource owner password (`password` grant).
    #[serde(default)]
    pub password: Option<String>,

    /// Requested scopes, space-separated.
    #[serde(default)]
    pub scope: Option<String>,
}

/// `POST /oauth/token` handler.
pub async fn token_handler(
    State(state): State<TokenEndpointState>,
    Form(form): Form<TokenRequestForm>,
) -> Result<Json<TokenResponseBody>, AuthError> {
    let request = GrantRequest {
        grant_type: form.grant_type,
        client_id: form.client_id,
        code: form.code,
        refresh_token: form.refresh_token,
        username: form.username,
        password: form.password,
        scope: form.scope,
    };
    let token = state.granter.grant(&request).await?;
    Ok(Json(token.into()))
}
