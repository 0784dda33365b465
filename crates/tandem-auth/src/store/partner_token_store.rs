//! Partner token store.
//!
//! Persists tokens obtained from partner identity providers on behalf of
//! local users, keyed by the fingerprint of (partner resource, local
//! authentication).
//!
//! Records are stored under the **raw** partner token value, unlike the
//! main token store which hashes values into keys. The asymmetry is
//! inherited from the exchange protocol and preserved deliberately;
//! unifying it would break compatibility with existing partner token
//! tables.

use std::sync::Arc;

use crate::AuthResult;
use crate::keys;
use crate::storage::PartnerTokenStorage;
use crate::types::{Authentication, BearerToken, PartnerResource, PartnerTokenRecord};

/// Store for partner-issued tokens.
pub struct PartnerTokenStore {
    tokens: Arc<dyn PartnerTokenStorage>,
}

impl PartnerTokenStore {
    /// Creates a partner token store over the given backend.
    pub fn new(tokens: Arc<dyn PartnerTokenStorage>) -> Self {
        Self { tokens }
    }

    /// Finds a partner token for the given resource and authentication.
    ///
    /// The fingerprint index is non-unique; when several records share it,
    /// any one of them satisfies the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn get_token(
        &self,
        resource: &PartnerResource,
        authentication: &Authentication,
    ) -> AuthResult<Option<PartnerTokenRecord>> {
        let authentication_id = keys::partner_token_key(resource, Some(authentication));
        let matches = self
            .tokens
            .find_by_authentication_id(&authentication_id)
            .await?;
        Ok(matches.into_iter().next())
    }

    /// Persists a partner token for the given resource and authentication.
    ///
    /// The record key is the raw token value, so saving the same token
    /// twice replaces the record in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn save_token(
        &self,
        resource: &PartnerResource,
        authentication: &Authentication,
        token: &BearerToken,
    ) -> AuthResult<()> {
        let record = PartnerTokenRecord {
            token_id: token.value.clone(),
            token: token.clone(),
            authentication_id: keys::partner_token_key(resource, Some(authentication)),
            client_id: resource.client_id.clone(),
            user_name: authentication.name().map(str::to_string),
        };
        self.tokens.put(&record).await
    }

    /// Deletes **all** partner tokens for the given resource and
    /// authentication.
    ///
    /// Called before a re-exchange saves its replacement, so stale
    /// generations never accumulate under one fingerprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn remove_tokens(
        &self,
        resource: &PartnerResource,
        authentication: &Authentication,
    ) -> AuthResult<()> {
        let authentication_id = keys::partner_token_key(resource, Some(authentication));
        let records = self
            .tokens
            .find_by_authentication_id(&authentication_id)
            .await?;
        let token_ids: Vec<String> = records.into_iter().map(|r| r.token_id).collect();
        self.tokens.delete_batch(&token_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    fn store() -> PartnerTokenStore {
        PartnerTokenStore::new(Arc::new(InMemoryStorage::new()))
    }

    fn resource() -> PartnerResource {
        PartnerResource {
            id: "alexa".to_string(),
            client_id: "partner-client".to_string(),
            scope: vec!["profile".to_string()],
        }
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = store();
        let auth = Authentication::user_id("alice");
        let token = BearerToken::new("partner-token-1").with_refresh_token("partner-rt");

        store.save_token(&resource(), &auth, &token).await.unwrap();

        let record = store.get_token(&resource(), &auth).await.unwrap().unwrap();
        assert_eq!(record.token, token);
        // Raw value is the primary key, by design.
        assert_eq!(record.token_id, "partner-token-1");
        assert_eq!(record.user_name.as_deref(), Some("alice"));
        assert_eq!(record.client_id, "partner-client");
    }

    #[tokio::test]
    async fn test_get_misses_other_users() {
        let store = store();
        let token = BearerToken::new("t1");
        store
            .save_token(&resource(), &Authentication::user_id("alice"), &token)
            .await
            .unwrap();

        assert!(
            store
                .get_token(&resource(), &Authentication::user_id("bob"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_remove_then_save_leaves_only_replacement() {
        let store = store();
        let auth = Authentication::user_id("alice");
        let t1 = BearerToken::new("gen-1");
        let t2 = BearerToken::new("gen-2");

        store.save_token(&resource(), &auth, &t1).await.unwrap();
        // Re-exchange: full cleanup, then save the new generation.
        store.remove_tokens(&resource(), &auth).await.unwrap();
        store.save_token(&resource(), &auth, &t2).await.unwrap();

        let record = store.get_token(&resource(), &auth).await.unwrap().unwrap();
        assert_eq!(record.token, t2);
    }

    #[tokio::test]
    async fn test_remove_deletes_every_generation() {
        let store = store();
        let auth = Authentication::user_id("alice");
        // Distinct values land as distinct records under one fingerprint.
        store
            .save_token(&resource(), &auth, &BearerToken::new("gen-1"))
            .await
            .unwrap();
        store
            .save_token(&resource(), &auth, &BearerToken::new("gen-2"))
            .await
            .unwrap();

        store.remove_tokens(&resource(), &auth).await.unwrap();
        assert!(store.get_token(&resource(), &auth).await.unwrap().is_none());

        // Removing when nothing is stored is fine.
        store.remove_tokens(&resource(), &auth).await.unwrap();
    }
}
