//! Token record store.
//!
//! Persists locally issued credentials and resolves them back by value, by
//! authentication fingerprint, or by issuing client. All lookups go
//! through derived keys ([`crate::keys`]); raw token values never serve as
//! storage keys here.

use std::sync::Arc;

use tracing::warn;

use crate::AuthResult;
use crate::error::AuthError;
use crate::keys;
use crate::storage::{AuthorizationCodeStorage, TokenStorage};
use crate::types::{
    AccessTokenRecord, Authentication, AuthorizationCodeRecord, BearerToken, RefreshTokenRecord,
    USER_NAME_SENTINEL,
};

/// Store for access tokens, refresh tokens, and authorization codes.
pub struct TokenStore {
    tokens: Arc<dyn TokenStorage>,
    codes: Arc<dyn AuthorizationCodeStorage>,
}

impl TokenStore {
    /// Creates a token store over the given backends.
    pub fn new(tokens: Arc<dyn TokenStorage>, codes: Arc<dyn AuthorizationCodeStorage>) -> Self {
        Self { tokens, codes }
    }

    /// Persists an access token together with the authentication that
    /// produced it.
    ///
    /// The record key is derived from the token value, so re-storing the
    /// same value replaces the record in place. If the token carries a
    /// refresh token, the corresponding [`RefreshTokenRecord`] is stored
    /// as well.
    ///
    /// # Errors
    ///
    /// Returns an error for a token without a value, or if the backing
    /// store is unavailable.
    pub async fn store_access_token(
        &self,
        token: &BearerToken,
        authentication: &Authentication,
    ) -> AuthResult<()> {
        let Some(token_id) = keys::extract_token_key(&token.value) else {
            return Err(AuthError::internal("access token has no value"));
        };

        let user_name = match authentication.name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => USER_NAME_SENTINEL.to_string(),
        };

        let refresh_token_id = token
            .refresh_token
            .as_deref()
            .and_then(keys::extract_token_key);

        let record = AccessTokenRecord {
            token_id,
            token: token.clone(),
            authentication_id: keys::authentication_key(authentication),
            client_id: authentication.client_id.clone(),
            user_name,
            authentication: authentication.clone(),
            refresh_token_id,
        };

        self.tokens.put_access_token(&record).await?;

        if let Some(refresh_value) = token.refresh_token.as_deref() {
            self.store_refresh_token(&BearerToken::new(refresh_value), authentication)
                .await?;
        }

        Ok(())
    }

    /// Loads an access token record by its token value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn read_access_token(
        &self,
        token_value: &str,
    ) -> AuthResult<Option<AccessTokenRecord>> {
        let Some(token_id) = keys::extract_token_key(token_value) else {
            return Ok(None);
        };
        self.tokens.get_access_token(&token_id).await
    }

    /// Finds an access token by authentication fingerprint.
    ///
    /// The fingerprint index is non-unique: when several tokens share it,
    /// any one of them is returned. Callers get best-effort last-write-wins
    /// semantics, not a guarantee of the latest token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn get_access_token(
        &self,
        authentication: &Authentication,
    ) -> AuthResult<Option<AccessTokenRecord>> {
        let authentication_id = keys::authentication_key(authentication);
        let matches = self
            .tokens
            .find_by_authentication_id(&authentication_id)
            .await?;
        Ok(matches.into_iter().next())
    }

    /// Deletes an access token by value. Deleting an absent token is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn remove_access_token(&self, token_value: &str) -> AuthResult<()> {
        let Some(token_id) = keys::extract_token_key(token_value) else {
            return Ok(());
        };
        if !self.tokens.delete_access_token(&token_id).await? {
            warn!(%token_id, "access token already removed");
        }
        Ok(())
    }

    /// Cascade-deletes every access token issued against the given refresh
    /// token. Used when a refresh token is revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn remove_access_token_by_refresh_token(
        &self,
        refresh_token_value: &str,
    ) -> AuthResult<()> {
        let Some(refresh_token_id) = keys::extract_token_key(refresh_token_value) else {
            return Ok(());
        };
        let records = self
            .tokens
            .find_by_refresh_token_id(&refresh_token_id)
            .await?;
        for record in records {
            self.tokens.delete_access_token(&record.token_id).await?;
        }
        Ok(())
    }

    /// Lists every access token issued to a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn find_tokens_by_client_id(
        &self,
        client_id: &str,
    ) -> AuthResult<Vec<AccessTokenRecord>> {
        self.tokens.find_by_client_id(client_id).await
    }

    /// Lists every access token issued to a client for a user. Used for
    /// bulk revocation when a user withdraws an approval.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn find_tokens_by_client_id_and_user_name(
        &self,
        client_id: &str,
        user_name: &str,
    ) -> AuthResult<Vec<AccessTokenRecord>> {
        self.tokens
            .find_by_client_id_and_user_name(client_id, user_name)
            .await
    }

    /// Persists a refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error for a token without a value, or if the backing
    /// store is unavailable.
    pub async fn store_refresh_token(
        &self,
        token: &BearerToken,
        authentication: &Authentication,
    ) -> AuthResult<()> {
        let Some(token_id) = keys::extract_token_key(&token.value) else {
            return Err(AuthError::internal("refresh token has no value"));
        };
        let record = RefreshTokenRecord {
            token_id,
            token: token.clone(),
            authentication: authentication.clone(),
        };
        self.tokens.put_refresh_token(&record).await
    }

    /// Loads a refresh token record by its token value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn read_refresh_token(
        &self,
        token_value: &str,
    ) -> AuthResult<Option<RefreshTokenRecord>> {
        let Some(token_id) = keys::extract_token_key(token_value) else {
            return Ok(None);
        };
        self.tokens.get_refresh_token(&token_id).await
    }

    /// Deletes a refresh token by value. Deleting an absent token is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn remove_refresh_token(&self, token_value: &str) -> AuthResult<()> {
        let Some(token_id) = keys::extract_token_key(token_value) else {
            return Ok(());
        };
        if !self.tokens.delete_refresh_token(&token_id).await? {
            warn!(%token_id, "refresh token already removed");
        }
        Ok(())
    }

    /// Resolves the authentication behind an access token value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn read_authentication(
        &self,
        token_value: &str,
    ) -> AuthResult<Option<Authentication>> {
        Ok(self
            .read_access_token(token_value)
            .await?
            .map(|record| record.authentication))
    }

    /// Resolves the authentication behind a refresh token value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn read_authentication_for_refresh_token(
        &self,
        token_value: &str,
    ) -> AuthResult<Option<Authentication>> {
        Ok(self
            .read_refresh_token(token_value)
            .await?
            .map(|record| record.authentication))
    }

    /// Stores a one-time authorization code.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateCode`] if the code already exists, or
    /// an error if the backing store is unavailable.
    pub async fn store_authorization_code(
        &self,
        code: &str,
        authentication: &Authentication,
    ) -> AuthResult<()> {
        let record = AuthorizationCodeRecord {
            code: code.to_string(),
            authentication: authentication.clone(),
        };
        self.codes.insert(&record).await
    }

    /// Redeems a one-time authorization code.
    ///
    /// The lookup deletes the record in the same logical operation; a
    /// second redemption of the same code observes `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn consume_authorization_code(
        &self,
        code: &str,
    ) -> AuthResult<Option<Authentication>> {
        Ok(self
            .codes
            .consume(code)
            .await?
            .map(|record| record.authentication))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    fn store() -> TokenStore {
        let storage = Arc::new(InMemoryStorage::new());
        TokenStore::new(storage.clone(), storage)
    }

    fn user_auth(client: &str, user: &str) -> Authentication {
        Authentication::for_user(client, ["profile".to_string()], user)
    }

    #[tokio::test]
    async fn test_store_and_read_round_trip() {
        let store = store();
        let auth = user_auth("web", "alice");
        let token = BearerToken::new("abc").with_scope(vec!["profile"]);

        store.store_access_token(&token, &auth).await.unwrap();

        let record = store.read_access_token("abc").await.unwrap().unwrap();
        assert_eq!(record.token, token);
        assert_eq!(record.authentication, auth);
        assert_eq!(record.user_name, "alice");
        assert_eq!(record.client_id, "web");
        assert_eq!(record.refresh_token_id, None);
    }

    #[tokio::test]
    async fn test_store_uses_sentinel_for_client_only_grants() {
        let store = store();
        let auth = Authentication::client_only("cli", ["profile".to_string()]);
        let token = BearerToken::new("abc");

        store.store_access_token(&token, &auth).await.unwrap();

        let record = store.read_access_token("abc").await.unwrap().unwrap();
        assert_eq!(record.user_name, USER_NAME_SENTINEL);
    }

    #[tokio::test]
    async fn test_store_also_persists_refresh_token() {
        let store = store();
        let auth = user_auth("web", "alice");
        let token = BearerToken::new("abc").with_refresh_token("rtX");

        store.store_access_token(&token, &auth).await.unwrap();

        let refresh = store.read_refresh_token("rtX").await.unwrap().unwrap();
        assert_eq!(refresh.token.value, "rtX");
        assert_eq!(refresh.authentication, auth);

        let access = store.read_access_token("abc").await.unwrap().unwrap();
        assert!(access.refresh_token_id.is_some());
    }

    #[tokio::test]
    async fn test_resave_same_value_overwrites_in_place() {
        let store = store();
        let auth = user_auth("web", "alice");

        let first = BearerToken::new("abc").with_scope(vec!["profile"]);
        store.store_access_token(&first, &auth).await.unwrap();

        let second = BearerToken::new("abc").with_scope(vec!["profile", "activity"]);
        store.store_access_token(&second, &auth).await.unwrap();

        let record = store.read_access_token("abc").await.unwrap().unwrap();
        assert_eq!(record.token, second);
        // Still exactly one record for this value.
        let all = store.find_tokens_by_client_id("web").await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_get_access_token_by_authentication() {
        let store = store();
        let auth = user_auth("web", "alice");
        let token = BearerToken::new("abc");
        store.store_access_token(&token, &auth).await.unwrap();

        let found = store.get_access_token(&auth).await.unwrap().unwrap();
        assert_eq!(found.token.value, "abc");

        let other = user_auth("web", "bob");
        assert!(store.get_access_token(&other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_access_token_returns_any_match() {
        let store = store();
        let auth = user_auth("web", "alice");
        store
            .store_access_token(&BearerToken::new("t1"), &auth)
            .await
            .unwrap();
        store
            .store_access_token(&BearerToken::new("t2"), &auth)
            .await
            .unwrap();

        // Two records share the fingerprint; one of the matching set comes
        // back, never something else.
        let found = store.get_access_token(&auth).await.unwrap().unwrap();
        assert!(["t1", "t2"].contains(&found.token.value.as_str()));
    }

    #[tokio::test]
    async fn test_remove_access_token_is_idempotent() {
        let store = store();
        let auth = user_auth("web", "alice");
        store
            .store_access_token(&BearerToken::new("abc"), &auth)
            .await
            .unwrap();

        store.remove_access_token("abc").await.unwrap();
        assert!(store.read_access_token("abc").await.unwrap().is_none());
        // Second delete of the same value succeeds.
        store.remove_access_token("abc").await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_by_refresh_token_cascades() {
        let store = store();
        let auth = user_auth("web", "alice");
        let token = BearerToken::new("abc").with_refresh_token("rtX");
        store.store_access_token(&token, &auth).await.unwrap();

        store
            .remove_access_token_by_refresh_token("rtX")
            .await
            .unwrap();

        assert!(store.read_access_token("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_tokens_by_client_and_user() {
        let store = store();
        store
            .store_access_token(&BearerToken::new("a1"), &user_auth("clientA", "alice"))
            .await
            .unwrap();
        store
            .store_access_token(&BearerToken::new("a2"), &user_auth("clientA", "alice"))
            .await
            .unwrap();
        store
            .store_access_token(&BearerToken::new("b1"), &user_auth("clientA", "bob"))
            .await
            .unwrap();
        store
            .store_access_token(&BearerToken::new("c1"), &user_auth("clientB", "alice"))
            .await
            .unwrap();

        let found = store
            .find_tokens_by_client_id_and_user_name("clientA", "alice")
            .await
            .unwrap();
        let mut values: Vec<&str> = found.iter().map(|r| r.token.value.as_str()).collect();
        values.sort();
        assert_eq!(values, ["a1", "a2"]);

        let by_client = store.find_tokens_by_client_id("clientA").await.unwrap();
        assert_eq!(by_client.len(), 3);
    }

    #[tokio::test]
    async fn test_authorization_code_single_use() {
        let store = store();
        let auth = user_auth("web", "alice");
        store.store_authorization_code("c1", &auth).await.unwrap();

        let first = store.consume_authorization_code("c1").await.unwrap();
        assert_eq!(first, Some(auth));
        let second = store.consume_authorization_code("c1").await.unwrap();
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_invariant_violation() {
        let store = store();
        let auth = user_auth("web", "alice");
        store.store_authorization_code("c1", &auth).await.unwrap();

        let err = store
            .store_authorization_code("c1", &auth)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateCode));
    }

    #[tokio::test]
    async fn test_read_authentication_paths() {
        let store = store();
        let auth = user_auth("web", "alice");
        let token = BearerToken::new("abc").with_refresh_token("rtX");
        store.store_access_token(&token, &auth).await.unwrap();

        assert_eq!(
            store.read_authentication("abc").await.unwrap(),
            Some(auth.clone())
        );
        assert_eq!(
            store
                .read_authentication_for_refresh_token("rtX")
                .await
                .unwrap(),
            Some(auth)
        );
        assert_eq!(store.read_authentication("nope").await.unwrap(), None);
        assert_eq!(store.read_authentication("").await.unwrap(), None);
    }
}
