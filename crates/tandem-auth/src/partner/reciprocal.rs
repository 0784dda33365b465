//! Reciprocal authorization exchange.
//!
//! A partner that has already linked an account posts a reciprocal
//! authorization code here; we redeem it at the partner's token endpoint
//! and store the resulting token for the authenticated local principal.
//! Replacement is remove-then-save: the previous generation is gone before
//! the new one lands, so a concurrent reader can miss but never pick a
//! superseded token after the exchange completes.

use std::sync::Arc;

use tracing::info;

use crate::AuthResult;
use crate::error::AuthError;
use crate::store::{PartnerRegistry, PartnerTokenStore};
use crate::types::Authentication;

use super::client::PartnerExchangeClient;

/// The only grant type this exchange accepts.
pub const RECIPROCAL_GRANT_TYPE: &str = "reciprocal_authorization_code";

/// A reciprocal authorization request, as posted by a partner.
#[derive(Debug, Clone)]
pub struct ReciprocalAuthorizationRequest {
    /// Must equal [`RECIPROCAL_GRANT_TYPE`].
    pub grant_type: String,

    /// The partner id. The wire field is `client_id`, but it carries the
    /// identifier we vend out to the partner, not the one the partner
    /// issued to us.
    pub partner_id: String,

    /// The authorization code to redeem at the partner's token endpoint.
    pub code: String,
}

/// Handler for reciprocal authorization-code redemption.
pub struct ReciprocalExchange {
    registry: Arc<PartnerRegistry>,
    tokens: Arc<PartnerTokenStore>,
    exchange: Arc<dyn PartnerExchangeClient>,
}

impl ReciprocalExchange {
    /// Creates a handler over the given registry, store, and exchange
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

    /// Redeems a reciprocal authorization code for the authenticated
    /// principal and stores the resulting partner token, replacing any
    /// prior token for the (partner, principal) pair.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UnsupportedGrantType`] for any grant type other than
    ///   `reciprocal_authorization_code`; nothing is mutated.
    /// - [`AuthError::UnknownPartner`] if the partner id is not registered.
    /// - [`AuthError::PartnerExchangeFailed`] if the partner's token
    ///   endpoint rejects the code.
    pub async fn authorize(
        &self,
        request: &ReciprocalAuthorizationRequest,
        authentication: &Authentication,
    ) -> AuthResult<()> {
        if request.grant_type != RECIPROCAL_GRANT_TYPE {
            return Err(AuthError::unsupported_grant_type(&request.grant_type));
        }

        let partner = self
            .registry
            .load_partner(&request.partner_id)
            .await?
            .ok_or_else(|| AuthError::unknown_partner(&request.partner_id))?;

        let token = self.exchange.exchange_code(&partner, &request.code).await?;

        let resource = partner.resource();

        // Remove-then-save. Never the other way around: two generations
        // must not coexist, or a concurrent reader may pick the stale one.
        self.tokens.remove_tokens(&resource, authentication).await?;
        self.tokens
            .save_token(&resource, authentication, &token)
            .await?;

        info!(
            partner_id = %request.partner_id,
            user = authentication.name().unwrap_or("<client>"),
            "reciprocal code exchanged"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::storage::InMemoryStorage;
    use crate::types::{BearerToken, Partner};

    struct MockExchangeClient {
        token: Option<BearerToken>,
    }

    #[async_trait]
    impl PartnerExchangeClient for MockExchangeClient {
        async fn exchange_code(&self, partner: &Partner, _code: &str) -> AuthResult<BearerToken> {
            self.token.clone().ok_or_else(|| {
                AuthError::partner_exchange_failed(&partner.partner_id, "code rejected")
            })
        }

        async fn refresh(
            &self,
            _partner: &Partner,
            _refresh_token: &str,
        ) -> AuthResult<BearerToken> {
            unimplemented!("not exercised by the reciprocal exchange")
        }
    }

    fn sample_partner() -> Partner {
        Partner {
            partner_id: "alexa".to_string(),
            client_id: "partner-client".to_string(),
            client_secret: "secret".to_string(),
            access_token_uri: "https://partner.example.com/token".to_string(),
            user_authorization_uri: None,
            pre_established_redirect_uri: None,
            scopes: vec!["profile".to_string()],
        }
    }

    async fn setup(token: Option<BearerToken>) -> (ReciprocalExchange, Arc<PartnerTokenStore>) {
        let storage = Arc::new(InMemoryStorage::new());
        let registry = Arc::new(PartnerRegistry::new(storage.clone()));
        registry.save_partner(&sample_partner()).await.unwrap();
        let tokens = Arc::new(PartnerTokenStore::new(storage));
        let exchange = ReciprocalExchange::new(
            registry,
            tokens.clone(),
            Arc::new(MockExchangeClient { token }),
        );
        (exchange, tokens)
    }

    fn request(grant_type: &str, partner_id: &str) -> ReciprocalAuthorizationRequest {
        ReciprocalAuthorizationRequest {
            grant_type: grant_type.to_string(),
            partner_id: partner_id.to_string(),
            code: "reciprocal-code".to_string(),
        }
    }

    #[tokio::test]
    async fn test_rejects_other_grant_types() {
        let (exchange, tokens) = setup(Some(BearerToken::new("t"))).await;
        let auth = Authentication::for_user("web", [], "alice");

        let err = exchange
            .authorize(&request("authorization_code", "alexa"), &auth)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedGrantType { .. }));

        // Nothing was stored.
        assert!(
            tokens
                .get_token(&sample_partner().resource(), &auth)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_unknown_partner() {
        let (exchange, _) = setup(Some(BearerToken::new("t"))).await;
        let auth = Authentication::for_user("web", [], "alice");

        let err = exchange
            .authorize(&request(RECIPROCAL_GRANT_TYPE, "ghost"), &auth)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownPartner { .. }));
    }

    #[tokio::test]
    async fn test_exchange_stores_token_for_principal() {
        let token = BearerToken::new("partner-at").with_refresh_token("partner-rt");
        let (exchange, tokens) = setup(Some(token.clone())).await;
        let auth = Authentication::for_user("web", [], "alice");

        exchange
            .authorize(&request(RECIPROCAL_GRANT_TYPE, "alexa"), &auth)
            .await
            .unwrap();

        let stored = tokens
            .get_token(&sample_partner().resource(), &auth)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.token, token);
        assert_eq!(stored.user_name.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_re_exchange_replaces_previous_generation() {
        let resource = sample_partner().resource();
        let auth = Authentication::for_user("web", [], "alice");

        let (exchange, tokens) = setup(Some(BearerToken::new("gen-2"))).await;
        tokens
            .save_token(&resource, &auth, &BearerToken::new("gen-1"))
            .await
            .unwrap();

        exchange
            .authorize(&request(RECIPROCAL_GRANT_TYPE, "alexa"), &auth)
            .await
            .unwrap();

        // Only the new generation remains.
        let stored = tokens.get_token(&resource, &auth).await.unwrap().unwrap();
        assert_eq!(stored.token.value, "gen-2");
    }

    #[tokio::test]
    async fn test_failed_exchange_leaves_existing_token() {
        let resource = sample_partner().resource();
        let auth = Authentication::for_user("web", [], "alice");

        let (exchange, tokens) = setup(None).await;
        tokens
            .save_token(&resource, &auth, &BearerToken::new("gen-1"))
            .await
            .unwrap();

        let err = exchange
            .authorize(&request(RECIPROCAL_GRANT_TYPE, "alexa"), &auth)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PartnerExchangeFailed { .. }));

        // The exchange failed before the cleanup step, so the previous
        // token is untouched.
        let stored = tokens.get_token(&resource, &auth).await.unwrap().unwrap();
        assert_eq!(stored.token.value, "gen-1");
    }
}
