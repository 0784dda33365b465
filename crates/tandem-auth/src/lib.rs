//! # tandem-auth
//!
//! OAuth2 credential storage and partner token exchange for the Tandem
//! authorization server.
//!
//! This crate provides:
//! - Content-addressed token storage with secondary-index lookups
//! - Single-use authorization codes
//! - A registry of reciprocally linked partner identity providers
//! - Get-or-refresh of partner-issued tokens
//! - Reciprocal authorization-code exchange
//! - Opaque token issuance behind an abstract grant boundary
//!
//! ## Modules
//!
//! - [`config`] - auth configuration
//! - [`keys`] - token key and authentication fingerprint derivation
//! - [`types`] - tokens, authentications, records, partners
//! - [`storage`] - record-level storage traits and the in-memory backend
//! - [`store`] - the token store, partner registry, and partner token store
//! - [`partner`] - partner exchange client, token manager, reciprocal flow
//! - [`grant`] - token issuance behind the [`grant::TokenGranter`] boundary
//! - [`middleware`] - bearer authentication extractors
//! - [`http`] - axum handlers for the API surface

pub mod config;
pub mod error;
pub mod grant;
pub mod http;
pub mod keys;
pub mod middleware;
pub mod partner;
pub mod storage;
pub mod store;
pub mod types;

pub use config::{AuthConfig, PartnerClientConfig, TokenLifetimeConfig};
pub use error::{AuthError, ErrorCategory};
pub use grant::{GrantRequest, OpaqueTokenGranter, TokenGranter};
pub use middleware::{AuthContext, AuthState, BearerAuth, ClientAdminAuth, UserAdminAuth};
pub use partner::{
    HttpPartnerExchangeClient, PartnerExchangeClient, PartnerTokenManager,
    RECIPROCAL_GRANT_TYPE, ReciprocalAuthorizationRequest, ReciprocalExchange,
};
pub use storage::{
    AuthorizationCodeStorage, InMemoryStorage, PartnerStorage, PartnerTokenStorage, TokenStorage,
};
pub use store::{PartnerRegistry, PartnerTokenStore, TokenStore};
pub use types::{
    AccessTokenRecord, Authentication, AuthorizationCodeRecord, BearerToken, InMemoryUserDirectory,
    Partner, PartnerResource, PartnerTokenRecord, Principal, RefreshTokenRecord, Role, User,
    UserDirectory,
};

/// Type alias for auth operation results.
pub type AuthResult<T> = Result<T, AuthError>;
