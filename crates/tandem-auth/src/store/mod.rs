//! Domain stores over the storage traits.
//!
//! - [`TokenStore`] - access tokens, refresh tokens, one-time codes
//! - [`PartnerRegistry`] - partner identity-provider metadata
//! - [`PartnerTokenStore`] - tokens obtained from partners
//!
//! The stores own key derivation and record construction; callers hand
//! them tokens and authentications, never records.

pub mod partner_registry;
pub mod partner_token_store;
pub mod token_store;

pub use partner_registry::PartnerRegistry;
pub use partner_token_store::PartnerTokenStore;
pub use token_store::TokenStore;
