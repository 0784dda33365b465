//! In-memory storage backend.
//!
//! Backs all four storage traits with concurrent maps. Index queries are
//! scans, which matches the secondary-index contract (non-unique,
//! order-unspecified results) at the small record counts this backend is
//! meant for: development and tests.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::AuthResult;
use crate::error::AuthError;
use crate::types::{
    AccessTokenRecord, AuthorizationCodeRecord, Partner, PartnerTokenRecord, RefreshTokenRecord,
};

use super::code::AuthorizationCodeStorage;
use super::partner::PartnerStorage;
use super::partner_token::PartnerTokenStorage;
use super::token::TokenStorage;

/// In-process storage for every record kind.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    access_tokens: DashMap<String, AccessTokenRecord>,
    refresh_tokens: DashMap<String, RefreshTokenRecord>,
    codes: DashMap<String, AuthorizationCodeRecord>,
    partners: DashMap<String, Partner>,
    partner_tokens: DashMap<String, PartnerTokenRecord>,
}

impl InMemoryStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for InMemoryStorage {
    async fn put_access_token(&self, record: &AccessTokenRecord) -> AuthResult<()> {
        self.access_tokens
            .insert(record.token_id.clone(), record.clone());
        Ok(())
    }

    async fn get_access_token(&self, token_id: &str) -> AuthResult<Option<AccessTokenRecord>> {
        Ok(self.access_tokens.get(token_id).map(|r| r.clone()))
    }

    async fn delete_access_token(&self, token_id: &str) -> AuthResult<bool> {
        Ok(self.access_tokens.remove(token_id).is_some())
    }

    async fn find_by_authentication_id(
        &self,
        authentication_id: &str,
    ) -> AuthResult<Vec<AccessTokenRecord>> {
        Ok(self
            .access_tokens
            .iter()
            .filter(|r| r.authentication_id == authentication_id)
            .map(|r| r.clone())
            .collect())
    }

    async fn find_by_refresh_token_id(
        &self,
        refresh_token_id: &str,
    ) -> AuthResult<Vec<AccessTokenRecord>> {
        Ok(self
            .access_tokens
            .iter()
            .filter(|r| r.refresh_token_id.as_deref() == Some(refresh_token_id))
            .map(|r| r.clone())
            .collect())
    }

    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Vec<AccessTokenRecord>> {
        Ok(self
            .access_tokens
            .iter()
            .filter(|r| r.client_id == client_id)
            .map(|r| r.clone())
            .collect())
    }

    async fn find_by_client_id_and_user_name(
        &self,
        client_id: &str,
        user_name: &str,
    ) -> AuthResult<Vec<AccessTokenRecord>> {
        Ok(self
            .access_tokens
            .iter()
            .filter(|r| r.client_id == client_id && r.user_name == user_name)
            .map(|r| r.clone())
            .collect())
    }

    async fn put_refresh_token(&self, record: &RefreshTokenRecord) -> AuthResult<()> {
        self.refresh_tokens
            .insert(record.token_id.clone(), record.clone());
        Ok(())
    }

    async fn get_refresh_token(&self, token_id: &str) -> AuthResult<Option<RefreshTokenRecord>> {
        Ok(self.refresh_tokens.get(token_id).map(|r| r.clone()))
    }

    async fn delete_refresh_token(&self, token_id: &str) -> AuthResult<bool> {
        Ok(self.refresh_tokens.remove(token_id).is_some())
    }
}

#[async_trait]
impl AuthorizationCodeStorage for InMemoryStorage {
    async fn insert(&self, record: &AuthorizationCodeRecord) -> AuthResult<()> {
        use dashmap::mapref::entry::Entry;

        match self.codes.entry(record.code.clone()) {
            Entry::Occupied(_) => Err(AuthError::DuplicateCode),
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCodeRecord>> {
        // DashMap::remove is the conditional delete: exactly one concurrent
        // caller gets the record back.
        Ok(self.codes.remove(code).map(|(_, record)| record))
    }
}

#[async_trait]
impl PartnerStorage for InMemoryStorage {
    async fn get(&self, partner_id: &str) -> AuthResult<Option<Partner>> {
        Ok(self.partners.get(partner_id).map(|p| p.clone()))
    }

    async fn list(&self) -> AuthResult<Vec<Partner>> {
        Ok(self.partners.iter().map(|p| p.clone()).collect())
    }

    async fn put(&self, partner: &Partner) -> AuthResult<()> {
        self.partners
            .insert(partner.partner_id.clone(), partner.clone());
        Ok(())
    }

    async fn delete(&self, partner_id: &str) -> AuthResult<bool> {
        Ok(self.partners.remove(partner_id).is_some())
    }
}

#[async_trait]
impl PartnerTokenStorage for InMemoryStorage {
    async fn put(&self, record: &PartnerTokenRecord) -> AuthResult<()> {
        self.partner_tokens
            .insert(record.token_id.clone(), record.clone());
        Ok(())
    }

    async fn find_by_authentication_id(
        &self,
        authentication_id: &str,
    ) -> AuthResult<Vec<PartnerTokenRecord>> {
        Ok(self
            .partner_tokens
            .iter()
            .filter(|r| r.authentication_id == authentication_id)
            .map(|r| r.clone())
            .collect())
    }

    async fn delete_batch(&self, token_ids: &[String]) -> AuthResult<()> {
        for token_id in token_ids {
            self.partner_tokens.remove(token_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Authentication, BearerToken};

    fn access_record(value: &str, auth_id: &str, client: &str, user: &str) -> AccessTokenRecord {
        AccessTokenRecord {
            token_id: format!("id-{value}"),
            token: BearerToken::new(value),
            authentication_id: auth_id.to_string(),
            client_id: client.to_string(),
            user_name: user.to_string(),
            authentication: Authentication::for_user(client, [], user),
            refresh_token_id: None,
        }
    }

    #[tokio::test]
    async fn test_access_token_round_trip() {
        let storage = InMemoryStorage::new();
        let record = access_record("abc", "fp1", "web", "alice");

        storage.put_access_token(&record).await.unwrap();
        let loaded = storage.get_access_token(&record.token_id).await.unwrap();
        assert_eq!(loaded, Some(record.clone()));

        assert!(storage.delete_access_token(&record.token_id).await.unwrap());
        assert!(!storage.delete_access_token(&record.token_id).await.unwrap());
        assert_eq!(storage.get_access_token(&record.token_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_index_queries() {
        let storage = InMemoryStorage::new();
        storage
            .put_access_token(&access_record("a", "fp1", "web", "alice"))
            .await
            .unwrap();
        storage
            .put_access_token(&access_record("b", "fp1", "web", "alice"))
            .await
            .unwrap();
        storage
            .put_access_token(&access_record("c", "fp2", "web", "bob"))
            .await
            .unwrap();

        assert_eq!(
            TokenStorage::find_by_authentication_id(&storage, "fp1")
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(storage.find_by_client_id("web").await.unwrap().len(), 3);
        assert_eq!(
            storage
                .find_by_client_id_and_user_name("web", "bob")
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(
            storage
                .find_by_client_id_and_user_name("web", "carol")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_code_insert_rejects_duplicates() {
        let storage = InMemoryStorage::new();
        let record = AuthorizationCodeRecord {
            code: "c1".to_string(),
            authentication: Authentication::for_user("web", [], "alice"),
        };

        AuthorizationCodeStorage::insert(&storage, &record).await.unwrap();
        let err = AuthorizationCodeStorage::insert(&storage, &record)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateCode));
    }

    #[tokio::test]
    async fn test_code_consume_is_single_use() {
        let storage = InMemoryStorage::new();
        let record = AuthorizationCodeRecord {
            code: "c1".to_string(),
            authentication: Authentication::for_user("web", [], "alice"),
        };
        AuthorizationCodeStorage::insert(&storage, &record).await.unwrap();

        let first = storage.consume("c1").await.unwrap();
        assert_eq!(first, Some(record));
        let second = storage.consume("c1").await.unwrap();
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn test_partner_token_batch_delete() {
        let storage = InMemoryStorage::new();
        for value in ["t1", "t2"] {
            PartnerTokenStorage::put(
                &storage,
                &PartnerTokenRecord {
                    token_id: value.to_string(),
                    token: BearerToken::new(value),
                    authentication_id: "fp".to_string(),
                    client_id: "partner-client".to_string(),
                    user_name: Some("alice".to_string()),
                },
            )
            .await
            .unwrap();
        }

        let found = PartnerTokenStorage::find_by_authentication_id(&storage, "fp")
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        let ids: Vec<String> = found.iter().map(|r| r.token_id.clone()).collect();
        storage.delete_batch(&ids).await.unwrap();
        assert!(
            PartnerTokenStorage::find_by_authentication_id(&storage, "fp")
                .await
                .unwrap()
                .is_empty()
        );

        // Deleting the same batch again is a no-op.
        storage.delete_batch(&ids).await.unwrap();
    }
}
