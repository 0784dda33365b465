//! Bearer token domain type.
//!
//! This is the serialized token blob persisted by the token stores: the
//! opaque token value plus its expiry, granted scopes, and the refresh
//! token value it travels with. Blobs are stored as structured JSON, not a
//! framework-specific binary format, so the store stays portable.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An opaque bearer token together with its grant metadata.
///
/// Token values are random and carry no embedded claims; everything a
/// resource server needs is resolved through the token store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BearerToken {
    /// The opaque token value presented by clients.
    pub value: String,

    /// Token type, `bearer` unless a partner says otherwise.
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// When this token expires (None = no expiration).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires_at: Option<OffsetDateTime>,

    /// Granted scopes, in grant order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,

    /// Refresh token value issued alongside this access token, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl BearerToken {
    /// Creates a bearer token with no expiry, scopes, or refresh token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            token_type: default_token_type(),
            expires_at: None,
            scope: Vec::new(),
            refresh_token: None,
        }
    }

    /// Sets the expiry timestamp.
    #[must_use]
    pub fn with_expires_at(mut self, expires_at: OffsetDateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the granted scopes.
    #[must_use]
    pub fn with_scope(mut self, scope: Vec<impl Into<String>>) -> Self {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the refresh token value.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Returns `true` if this token has an expiry in the past.
    ///
    /// A token without an expiry never expires.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_ttl_seconds().is_some_and(|ttl| ttl <= 0)
    }

    /// Returns the remaining time-to-live in whole seconds, or `None` for
    /// tokens without an expiry. Zero or negative means expired.
    #[must_use]
    pub fn remaining_ttl_seconds(&self) -> Option<i64> {
        self.expires_at
            .map(|exp| (exp - OffsetDateTime::now_utc()).whole_seconds())
    }

    /// Generate a cryptographically secure random token value.
    ///
    /// Returns a 256-bit random value encoded as base64url (43 characters).
    #[must_use]
    pub fn generate_value() -> String {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
