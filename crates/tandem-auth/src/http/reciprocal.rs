//! Reciprocal authorization endpoint.
//!
//! `POST /api/reciprocal/authorize` with form fields
//! `grant_type=reciprocal_authorization_code`, `client_id=<partnerId>`,
//! `code=<authCode>`.
//!
//! Invoked by a partner that has linked an account and now hands us a
//! code redeemable at its own token endpoint. Success has no response
//! body.

use std::sync::Arc;

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::AuthError;
use crate::middleware::BearerAuth;
use crate::partner::{ReciprocalAuthorizationRequest, ReciprocalExchange};

/// State for the reciprocal authorization endpoint.
#[derive(Clone)]
pub struct ReciprocalState {
    /// Exchange handler.
    pub exchange: Arc<ReciprocalExchange>,
}

impl ReciprocalState {
    /// Creates the endpoint state.
    pub fn new(exchange: Arc<ReciprocalExchange>) -> Self {
        Self { exchange }
    }
}

/// Form body of a reciprocal authorization request.
#[derive(Debug, Deserialize)]
pub struct ReciprocalForm {
    /// Must be `reciprocal_authorization_code`.
    pub grant_type: String,

    /// The partner id we vend out, posted by the partner as `client_id`.
    pub client_id: String,

    /// The authorization code to redeem.
    pub code: String,
}

/// `POST /api/reciprocal/authorize` handler.
pub async fn reciprocal_authorize_handler(
    State(state): State<ReciprocalState>,
    BearerAuth(ctx): BearerAuth,
    Form(form): Form<ReciprocalForm>,
) -> Result<StatusCode, AuthError> {
    let request = ReciprocalAuthorizationRequest {
        grant_type: form.grant_type,
        partner_id: form.client_id,
        code: form.code,
    };
    state
        .exchange
        .authorize(&request, &ctx.authentication)
        .await?;
    Ok(StatusCode::OK)
}
