//! Access and refresh token storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{AccessTokenRecord, RefreshTokenRecord};

/// Storage for access and refresh token records.
///
/// Access tokens are reachable by primary key (`token_id`) and by three
/// secondary index paths: `authentication_id`, `refresh_token_id`, and
/// `(client_id, user_name)`. Refresh tokens are primary-key only.
///
/// # Consistency
///
/// Puts and deletes are atomic per item. Index queries may lag writes
/// (eventual consistency) and the `authentication_id` index is non-unique:
/// callers must accept any one of the returned matches.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Upserts an access token record by `token_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn put_access_token(&self, record: &AccessTokenRecord) -> AuthResult<()>;

    /// Loads an access token record by primary key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn get_access_token(&self, token_id: &str) -> AuthResult<Option<AccessTokenRecord>>;

    /// Deletes an access token record by primary key.
    ///
    /// Returns `false` if no record existed; deleting an absent record is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn delete_access_token(&self, token_id: &str) -> AuthResult<bool>;

    /// Queries the `authenticationId-index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn find_by_authentication_id(
        &self,
        authentication_id: &str,
    ) -> AuthResult<Vec<AccessTokenRecord>>;

    /// Queries the `refreshToken-index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn find_by_refresh_token_id(
        &self,
        refresh_token_id: &str,
    ) -> AuthResult<Vec<AccessTokenRecord>>;

    /// Queries the `clientId-userName-index` by hash key only.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Vec<AccessTokenRecord>>;

    /// Queries the `clientId-userName-index` by hash and sort key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn find_by_client_id_and_user_name(
        &self,
        client_id: &str,
        user_name: &str,
    ) -> AuthResult<Vec<AccessTokenRecord>>;

    /// Upserts a refresh token record by `token_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn put_refresh_token(&self, record: &RefreshTokenRecord) -> AuthResult<()>;

    /// Loads a refresh token record by primary key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn get_refresh_token(&self, token_id: &str) -> AuthResult<Option<RefreshTokenRecord>>;

    /// Deletes a refresh token record by primary key.
    ///
    /// Returns `false` if no record existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn delete_refresh_token(&self, token_id: &str) -> AuthResult<bool>;
}
