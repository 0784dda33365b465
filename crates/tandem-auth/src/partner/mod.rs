//! Partner token exchange.
//!
//! - [`PartnerExchangeClient`] - the external token-endpoint collaborator
//! - [`PartnerTokenManager`] - get-or-refresh of stored partner tokens
//! - [`ReciprocalExchange`] - reciprocal authorization-code redemption

pub mod client;
pub mod manager;
pub mod reciprocal;

pub use client::{HttpPartnerExchangeClient, PartnerExchangeClient};
pub use manager::PartnerTokenManager;
pub use reciprocal::{RECIPROCAL_GRANT_TYPE, ReciprocalExchange, ReciprocalAuthorizationRequest};
