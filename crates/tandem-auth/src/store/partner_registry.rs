//! Partner registry.
//!
//! Read-mostly store of partner identity-provider metadata, mutated only
//! through the administrative API.

use std::sync::Arc;

use tracing::{info, warn};

use crate::AuthResult;
use crate::storage::PartnerStorage;
use crate::types::Partner;

/// Registry of partner identity providers.
pub struct PartnerRegistry {
    partners: Arc<dyn PartnerStorage>,
}

impl PartnerRegistry {
    /// Creates a registry over the given backend.
    pub fn new(partners: Arc<dyn PartnerStorage>) -> Self {
        Self { partners }
    }

    /// Loads a partner by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn load_partner(&self, partner_id: &str) -> AuthResult<Option<Partner>> {
        self.partners.get(partner_id).await
    }

    /// Lists all registered partners. Full scan; partner sets are small
    /// and administrator-managed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn list_partners(&self) -> AuthResult<Vec<Partner>> {
        self.partners.list().await
    }

    /// Creates or replaces a partner registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn save_partner(&self, partner: &Partner) -> AuthResult<()> {
        self.partners.put(partner).await?;
        info!(partner_id = %partner.partner_id, "partner saved");
        Ok(())
    }

    /// Deletes a partner registration. Deleting an absent partner is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    pub async fn delete_partner(&self, partner_id: &str) -> AuthResult<()> {
        if !self.partners.delete(partner_id).await? {
            warn!(%partner_id, "partner already deleted");
        }
        Ok(())
    }
}
