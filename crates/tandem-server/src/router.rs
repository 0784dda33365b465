//! HTTP router.

use axum::Router;
use axum::routing::{delete, get, post};
use tandem_auth::http::{
    delete_partner_handler, list_partners_handler, partner_token_handler,
    reciprocal_authorize_handler, save_partner_handler, token_handler,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/oauth/token", post(token_handler))
        .route("/api/partner/token", get(partner_token_handler))
        .route("/api/reciprocal/authorize", post(reciprocal_authorize_handler))
        .route(
            "/api/admin/partners",
            get(list_partners_handler).put(save_partner_handler),
        )
        .route("/api/admin/partners/{partner_id}", delete(delete_partner_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
