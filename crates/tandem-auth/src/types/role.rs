//! Authorities granted to users and clients.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Authorities recognized by the authorization server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Administrators who manage clients and partners.
    #[serde(rename = "ROLE_USER_ADMIN")]
    UserAdmin,

    /// The internal administration OAuth client, permitted to read
    /// partner tokens on behalf of users.
    #[serde(rename = "ROLE_CLIENT_ADMIN")]
    ClientAdmin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserAdmin => write!(f, "ROLE_USER_ADMIN"),
            Self::ClientAdmin => write!(f, "ROLE_CLIENT_ADMIN"),
        }
    }
}
