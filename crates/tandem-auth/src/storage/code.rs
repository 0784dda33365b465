//! Authorization code storage trait.
//!
//! Codes are one-time credentials: the read that redeems a code must
//! delete it in the same logical operation, and a second redemption must
//! observe nothing.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AuthorizationCodeRecord;

/// Storage for one-time authorization codes.
#[async_trait]
pub trait AuthorizationCodeStorage: Send + Sync {
    /// Inserts a new code record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::DuplicateCode`] if the code already
    /// exists. Codes are caller-random, so a collision is an invariant
    /// violation, not a client error.
    async fn insert(&self, record: &AuthorizationCodeRecord) -> AuthResult<()>;

    /// Atomically removes a code record, returning it if it was present.
    ///
    /// Exactly one of any set of concurrent callers observes the record;
    /// the rest get `None`. Implementations without a native atomic
    /// read-then-delete must use a conditional delete and treat "already
    /// removed" identically to "not found".
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCodeRecord>>;
}
