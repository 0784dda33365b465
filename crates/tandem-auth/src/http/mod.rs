//! Axum HTTP handlers for the token and partner endpoints.
//!
//! - `GET /api/partner/token` - [`partner_token::partner_token_handler`]
//! - `POST /api/reciprocal/authorize` - [`reciprocal::reciprocal_authorize_handler`]
//! - `POST /oauth/token` - [`token::token_handler`]
//! - `/api/admin/partners` - [`admin`] CRUD

pub mod admin;
pub mod partner_token;
pub mod reciprocal;
pub mod token;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::AuthError;
use crate::types::BearerToken;

pub use admin::{
    AdminState, delete_partner_handler, list_partners_handler, save_partner_handler,
};
pub use partner_token::{PartnerTokenState, partner_token_handler};
pub use reciprocal::{ReciprocalState, reciprocal_authorize_handler};
pub use token::{TokenEndpointState, token_handler};

/// Bearer-token JSON body returned by token-yielding endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponseBody {
    /// The opaque token value.
    pub access_token: String,

    /// Token type, `bearer`.
    pub token_type: String,

    /// Seconds until expiry, when the token expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Refresh token value, when one was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Granted scopes, space-separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl From<BearerToken> for TokenResponseBody {
    fn from(token: BearerToken) -> Self {
        let scope = if token.scope.is_empty() {
            None
        } else {
            Some(token.scope.join(" "))
        };
        Self {
            access_token: token.value,
            token_type: token.token_type,
            expires_in: token
                .expires_at
                .map(|exp| (exp - time::OffsetDateTime::now_utc()).whole_seconds()),
            refresh_token: token.refresh_token,
            scope,
        }
    }
}

/// RFC 6749-style error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// OAuth 2.0 error code.
    pub error: String,

    /// Human-readable description.
    pub error_description: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::InvalidClient { .. }
            | AuthError::UnknownPartner { .. }
            | AuthError::NoTokenForUser { .. }
            | AuthError::InvalidGrant { .. }
            | AuthError::UnsupportedGrantType { .. } => StatusCode::BAD_REQUEST,
            AuthError::TokenNotFound => StatusCode::NOT_FOUND,
            AuthError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::PartnerExchangeFailed { .. } | AuthError::PartnerRefreshFailed { .. } => {
                StatusCode::BAD_GATEWAY
            }
            AuthError::Storage { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::DuplicateCode
            | AuthError::Configuration { .. }
            | AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(category = %self.category(), "{self}");
        } else {
            warn!(category = %self.category(), "{self}");
        }

        let body = ErrorBody {
            error: self.oauth_error_code().to_string(),
            error_description: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn test_token_response_body_shape() {
        let token = BearerToken::new("abc")
            .with_expires_at(time::OffsetDateTime::now_utc() + Duration::hours(1))
            .with_scope(vec!["profile", "activity"])
            .with_refresh_token("rt");
        let body = TokenResponseBody::from(token);

        assert_eq!(body.access_token, "abc");
        assert_eq!(body.token_type, "bearer");
        assert!(body.expires_in.unwrap() > 3500);
        assert_eq!(body.scope.as_deref(), Some("profile activity"));
        assert_eq!(body.refresh_token.as_deref(), Some("rt"));
    }

    #[test]
    fn test_token_response_omits_empty_fields() {
        let body = TokenResponseBody::from(BearerToken::new("abc"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"access_token": "abc", "token_type": "bearer"})
        );
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (AuthError::unknown_partner("p"), StatusCode::BAD_REQUEST),
            (AuthError::TokenNotFound, StatusCode::NOT_FOUND),
            (AuthError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (AuthError::forbidden("x"), StatusCode::FORBIDDEN),
            (
                AuthError::partner_refresh_failed("p", "x"),
                StatusCode::BAD_GATEWAY,
            ),
            (AuthError::storage("x"), StatusCode::SERVICE_UNAVAILABLE),
            (AuthError::DuplicateCode, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
