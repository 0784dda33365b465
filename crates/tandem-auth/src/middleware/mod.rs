//! HTTP middleware for bearer authentication and authority checks.

pub mod auth;

pub use auth::{AuthContext, AuthState, BearerAuth, ClientAdminAuth, UserAdminAuth};
