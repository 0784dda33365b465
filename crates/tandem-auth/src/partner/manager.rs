//! Partner token manager.
//!
//! Resolves a usable partner access token for a local user, refreshing
//! through the partner's token endpoint when the stored token has run out
//! of lifetime. Refresh happens on the read path; there is no background
//! refresher, so the first access after expiry pays the endpoint
//! round-trip.

use std::sync::Arc;

use tracing::{debug, info};

use crate::AuthResult;
use crate::error::AuthError;
use crate::store::{PartnerRegistry, PartnerTokenStore};
use crate::types::{Authentication, BearerToken};

use super::client::PartnerExchangeClient;

/// Get-or-refresh orchestration for stored partner tokens.
pub struct PartnerTokenManager {
    registry: Arc<PartnerRegistry>,
    tokens: Arc<PartnerTokenStore>,
    exchange: Arc<dyn PartnerExchangeClient>,
}

impl PartnerTokenManager {
    /// Creates a manager over the given registry, store, and exchange
    /// client.
    pub fn new(
        registry: Arc<PartnerRegistry>,
        tokens: Arc<PartnerTokenStore>,
        exchange: Arc<dyn PartnerExchangeClient>,
    ) -> Self {
        Self {
            registry,
            tokens,
            exchange,
        }
    }

    /// Returns the partner access token for `(user_id, partner_id)`,
    /// refreshing it first if it has expired.
    ///
    /// No lock is held across the refresh call: concurrent requests for
    /// the same expired token may all refresh, and the last writer's token
    /// is the one retained. Superseded values are removed before the
    /// replacement is saved, so they are never handed out afterwards.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UnknownPartner`] if the partner is not registered.
    /// - [`AuthError::NoTokenForUser`] if the user has never linked this
    ///   partner.
    /// - [`AuthError::PartnerRefreshFailed`] if the partner rejects the
    ///   refresh; the stale record is retained for inspection.
    pub async fn get_access_token(
        &self,
        user_id: &str,
        partner_id: &str,
    ) -> AuthResult<BearerToken> {
        let partner = self
            .registry
            .load_partner(partner_id)
            .await?
            .ok_or_else(|| AuthError::unknown_partner(partner_id))?;

        let resource = partner.resource();
        let authentication = Authentication::user_id(user_id);

        let record = self
            .tokens
            .get_token(&resource, &authentication)
            .await?
            .ok_or_else(|| AuthError::no_token_for_user(user_id))?;

        let token = if record.token.is_expired() {
            debug!(%partner_id, %user_id, "stored partner token expired, refreshing");

            let refresh_value = record.token.refresh_token.as_deref().ok_or_else(|| {
                AuthError::partner_refresh_failed(
                    partner_id,
                    "expired token has no refresh token",
                )
            })?;

            let mut refreshed = self.exchange.refresh(&partner, refresh_value).await?;

            // Partners may omit the refresh token from a refresh response;
            // the stored one stays valid in that case.
            if refreshed.refresh_token.is_none() {
                refreshed.refresh_token = record.token.refresh_token.clone();
            }

            // Replace, never accumulate: drop every record under this
            // fingerprint before the fresh one lands.
            self.tokens.remove_tokens(&resource, &authentication).await?;
            self.tokens
                .save_token(&resource, &authentication, &refreshed)
                .await?;

            info!(%partner_id, %user_id, "partner token refreshed");
            refreshed
        } else {
            let token = record.token;
            self.tokens
                .save_token(&resource, &authentication, &token)
                .await?;
            token
        };

        Ok(token)
    }
}
