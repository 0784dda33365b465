//! Partner registration storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Partner;

/// Storage for partner identity-provider registrations.
///
/// Partner sets are small and administrator-managed; `list` is a full
/// scan and is not meant for high cardinality.
#[async_trait]
pub trait PartnerStorage: Send + Sync {
    /// Loads a partner by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn get(&self, partner_id: &str) -> AuthResult<Option<Partner>>;

    /// Lists all registered partners.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn list(&self) -> AuthResult<Vec<Partner>>;

    /// Upserts a partner registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn put(&self, partner: &Partner) -> AuthResult<()>;

    /// Deletes a partner registration.
    ///
    /// Returns `false` if no record existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    async fn delete(&self, partner_id: &str) -> AuthResult<bool>;
}
