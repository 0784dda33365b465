//! Partner administration endpoints.
//!
//! JSON CRUD over the partner registry, for administrators holding the
//! `ROLE_USER_ADMIN` authority:
//!
//! - `GET /api/admin/partners` - list registrations
//! - `PUT /api/admin/partners` - create or replace a registration
//! - `DELETE /api/admin/partners/{partner_id}` - delete a registration

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::error::AuthError;
use crate::middleware::UserAdminAuth;
use crate::store::PartnerRegistry;
use crate::types::Partner;

/// State for the partner administration endpoints.
#[derive(Clone)]
pub struct AdminState {
    /// The partner registry.
    pub registry: Arc<PartnerRegistry>,
}

impl AdminState {
    /// Creates the endpoint state.
    pub fn new(registry: Arc<PartnerRegistry>) -> Self {
        Self { registry }
    }
}

/// `GET /api/admin/partners` handler.
pub async fn list_partners_handler(
    State(state): State<AdminState>,
    _auth: UserAdminAuth,
) -> Result<Json<Vec<Partner>>, AuthError> {
    Ok(Json(state.registry.list_partners().await?))
}

/// `PUT /api/admin/partners` handler.
pub async fn save_partner_handler(
    State(state): State<AdminState>,
    _auth: UserAdminAuth,
    Json(partner): Json<Partner>,
) -> Result<StatusCode, AuthError> {
    state.registry.save_partner(&partner).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/admin/partners/{partner_id}` handler.
pub async fn delete_partner_handler(
    State(state): State<AdminState>,
    _auth: UserAdminAuth,
    Path(partner_id): Path<String>,
) -> Result<StatusCode, AuthError> {
    state.registry.delete_partner(&partner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
