//! Partner token retrieval endpoint.
//!
//! `GET /api/partner/token?user_id=<id>&partner_id=<id>`
//!
//! Called by the internal administration client to fetch (and, when
//! needed, refresh) the partner token stored for a user. Requires the
//! `ROLE_CLIENT_ADMIN` authority.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::error::AuthError;
use crate::middleware::ClientAdminAuth;
use crate::partner::PartnerTokenManager;

use super::TokenResponseBody;

/// State for the partner token endpoint.
#[derive(Clone)]
pub struct PartnerTokenState {
    /// Get-or-refresh orchestrator.
    pub manager: Arc<PartnerTokenManager>,
}

impl PartnerTokenState {
    /// Creates the endpoint state.
    pub fn new(manager: Arc<PartnerTokenManager>) -> Self {
        Self { manager }
    }
}

/// Query parameters for partner token retrieval.
#[derive(Debug, Deserialize)]
pub struct PartnerTokenParams {
    /// The local user whose partner token to fetch.
    pub user_id: String,

    /// The partner the token was obtained from.
    pub partner_id: String,
}

/// `GET /api/partner/token` handler.
pub async fn partner_token_handler(
    State(state): State<PartnerTokenState>,
    _auth: ClientAdminAuth,
    Query(params): Query<PartnerTokenParams>,
) -> Result<Json<TokenResponseBody>, AuthError> {
    let token = state
        .manager
        .get_access_token(&params.user_id, &params.partner_id)
        .await?;
    Ok(Json(token.into()))
}
