//! Partner identity-provider metadata.
//!
//! A [`Partner`] describes an external OAuth2 provider with which accounts
//! are reciprocally linked: its token endpoint, the credentials we hold
//! with it, and the scopes we request. Partner records are read-mostly and
//! mutated only through the administrative API.

use serde::{Deserialize, Serialize};

/// A registered partner identity provider in the `OAuthPartner` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    /// Primary key: the identifier we vend out to the partner. Reciprocal
    /// authorization requests carry it in their `client_id` field.
    pub partner_id: String,

    /// Our client id registered with the partner.
    pub client_id: String,

    /// Our client secret registered with the partner.
    pub client_secret: String,

    /// The partner's token endpoint.
    pub access_token_uri: String,

    /// The partner's user authorization endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_authorization_uri: Option<String>,

    /// Redirect URI pre-registered with the partner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_established_redirect_uri: Option<String>,

    /// Scopes requested from the partner, in request order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

impl Partner {
    /// Returns the protected-resource view of this partner used for key
    /// derivation and exchange requests.
    #[must_use]
    pub fn resource(&self) -> PartnerResource {
        PartnerResource {
            id: self.partner_id.clone(),
            client_id: self.client_id.clone(),
            scope: self.scopes.clone(),
        }
    }
}

/// The slice of partner metadata that identifies a protected resource:
/// what the partner token fingerprint is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerResource {
    /// The partner id.
    pub id: String,

    /// Our client id with the partner.
    pub client_id: String,

    /// Scopes requested from the partner.
    pub scope: Vec<String>,
}
