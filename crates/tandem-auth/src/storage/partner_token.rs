//! Partner token storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::PartnerTokenRecord;

/// Storage for tokens obtained from partner identity providers.
///
/// Records are keyed by the raw partner token value and reached through
/// the non-unique `authenticationId-index`. Replacement on re-exchange is
/// a batch delete of every record sharing a fingerprint followed by a put
/// of the new record; the delete comes first so a concurrent reader never
/// resurrects a superseded token after the new one lands.
#[async_trait]
pub trait PartnerTokenStorage: Send + Sync {
    /// Upserts a partner token record by its raw token value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn put(&self, record: &PartnerTokenRecord) -> AuthResult<()>;

    /// Queries the `authenticationId-index`.
    ///
    /// The index is non-unique; any one of the returned records satisfies
    /// a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn find_by_authentication_id(
        &self,
        authentication_id: &str,
    ) -> AuthResult<Vec<PartnerTokenRecord>>;

    /// Deletes the records with the given raw token values.
    ///
    /// Absent records are skipped, not errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn delete_batch(&self, token_ids: &[String]) -> AuthResult<()>;
}
