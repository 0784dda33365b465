//! Persisted record types.
//!
//! All records are immutable value snapshots; updates are whole-record
//! replaces. Records are constructed only by the store services in
//! [`crate::store`] — nothing outside the stores writes them.

use serde::{Deserialize, Serialize};

use super::authentication::Authentication;
use super::token::BearerToken;

/// Sort-key value stored in place of a user name for client-only grants.
pub const USER_NAME_SENTINEL: &str = "#";

/// A persisted access token in the `OAuthAccessToken` table.
///
/// Retrievable by three paths: the content-addressed `token_id` primary
/// key, the `authentication_id` secondary index (non-unique), and the
/// `(client_id, user_name)` secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenRecord {
    /// Primary key: digest of the token value.
    pub token_id: String,

    /// The serialized token blob.
    pub token: BearerToken,

    /// Authentication fingerprint; secondary index, non-unique.
    pub authentication_id: String,

    /// Issuing client; secondary index hash key.
    pub client_id: String,

    /// Principal name, or [`USER_NAME_SENTINEL`] for client-only grants;
    /// secondary index sort key.
    pub user_name: String,

    /// The serialized authentication blob.
    pub authentication: Authentication,

    /// Digest of the associated refresh token value; secondary index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_id: Option<String>,
}

/// A persisted refresh token in the `OAuthRefreshToken` table.
///
/// Primary-key access only; the cascade from refresh token to access
/// tokens goes through the access-token table's `refreshToken-index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRecord {
    /// Primary key: digest of the refresh token value.
    pub token_id: String,

    /// The serialized token blob.
    pub token: BearerToken,

    /// The serialized authentication blob.
    pub authentication: Authentication,
}

/// A persisted one-time authorization code in the `OAuthCode` table.
///
/// Single-use: a successful lookup deletes the record in the same logical
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationCodeRecord {
    /// Primary key: the caller-supplied random code.
    pub code: String,

    /// The serialized authentication blob.
    pub authentication: Authentication,
}

/// A persisted partner-issued token in the `OAuthPartnerToken` table.
///
/// Unlike [`AccessTokenRecord`], the primary key is the **raw** token
/// value. The asymmetry is inherited from the exchange protocol's history
/// and is preserved for compatibility with existing deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerTokenRecord {
    /// Primary key: the raw partner token value.
    pub token_id: String,

    /// The serialized token blob, including the partner's refresh token.
    pub token: BearerToken,

    /// Fingerprint of (partner resource, local authentication); secondary
    /// index, non-unique. A query may return several records, any one of
    /// which is acceptable to the caller.
    pub authentication_id: String,

    /// The partner-side client id; secondary index hash key.
    pub client_id: String,

    /// Local principal name; secondary index sort key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_record_round_trip() {
        let record = AccessTokenRecord {
            token_id: "id-1".to_string(),
            token: BearerToken::new("abc").with_refresh_token("rt"),
            authentication_id: "auth-1".to_string(),
            client_id: "web".to_string(),
            user_name: "alice".to_string(),
            authentication: Authentication::for_user("web", [], "alice"),
            refresh_token_id: Some("rt-id".to_string()),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: AccessTokenRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_partner_token_record_allows_missing_user() {
        let json = r#"{
            "tokenId": "raw-token",
            "token": {"value": "raw-token"},
            "authenticationId": "fp",
            "clientId": "partner-client"
        }"#;
        let record: PartnerTokenRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.user_name, None);
        assert_eq!(record.token_id, record.token.value);
    }
}
