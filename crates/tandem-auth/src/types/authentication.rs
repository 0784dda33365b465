//! Authentication context domain type.
//!
//! An [`Authentication`] is the snapshot persisted alongside every token:
//! the client the grant was issued to, the granted scopes, and the
//! authenticated principal (absent for client-only grants). It is the input
//! to the authentication fingerprint in [`crate::keys`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::role::Role;

/// The authenticated principal behind a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// The principal's user name.
    pub username: String,

    /// Granted authorities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorities: Vec<Role>,
}

/// An authentication context: client identity, granted scopes, and the
/// optional user principal.
///
/// Scopes are kept sorted (`BTreeSet`) so that serialization and key
/// derivation are order-independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authentication {
    /// The OAuth client the grant was issued to. Empty for synthetic
    /// user-id authentications used by the partner token lookup path.
    #[serde(default)]
    pub client_id: String,

    /// Granted scopes.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub scope: BTreeSet<String>,

    /// The authenticated principal; `None` for client-only grants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
}

impl Authentication {
    /// Creates a client-only authentication (client-credentials grant).
    #[must_use]
    pub fn client_only(client_id: impl Into<String>, scope: impl IntoIterator<Item = String>) -> Self {
        Self {
            client_id: client_id.into(),
            scope: scope.into_iter().collect(),
            principal: None,
        }
    }

    /// Creates an authentication for a user principal under a client.
    #[must_use]
    pub fn for_user(
        client_id: impl Into<String>,
        scope: impl IntoIterator<Item = String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            scope: scope.into_iter().collect(),
            principal: Some(Principal {
                username: username.into(),
                authorities: Vec::new(),
            }),
        }
    }

    /// Creates a synthetic user-id authentication with no client context.
    ///
    /// Used when resolving partner tokens for a bare user id, where only
    /// the principal name participates in key derivation.
    #[must_use]
    pub fn user_id(user_id: impl Into<String>) -> Self {
        Self {
            client_id: String::new(),
            scope: BTreeSet::new(),
            principal: Some(Principal {
                username: user_id.into(),
                authorities: Vec::new(),
            }),
        }
    }

    /// Attaches authorities to the principal, if one is present.
    #[must_use]
    pub fn with_authorities(mut self, authorities: Vec<Role>) -> Self {
        if let Some(principal) = self.principal.as_mut() {
            principal.authorities = authorities;
        }
        self
    }

    /// Returns the principal's user name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.principal.as_ref().map(|p| p.username.as_str())
    }

    /// Returns `true` if this authentication has no user principal.
    #[must_use]
    pub fn is_client_only(&self) -> bool {
        self.principal.is_none()
    }

    /// Returns `true` if the principal carries the given authority.
    #[must_use]
    pub fn has_authority(&self, role: Role) -> bool {
        self.principal
            .as_ref()
            .is_some_and(|p| p.authorities.contains(&role))
    }

    /// Returns the granted scopes joined in sorted order, space-separated.
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scope.iter().cloned().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_only() {
        let auth = Authentication::client_only("admin-cli", ["profile".to_string()]);
        assert!(auth.is_client_only());
        assert_eq!(auth.name(), None);
        assert_eq!(auth.scope_string(), "profile");
    }

    #[test]
    fn test_for_user() {
        let auth = Authentication::for_user("web", ["a".to_string(), "b".to_string()], "alice");
        assert!(!auth.is_client_only());
        assert_eq!(auth.name(), Some("alice"));
    }

    #[test]
    fn test_scope_string_is_sorted() {
        let auth = Authentication::client_only(
            "c",
            ["zebra".to_string(), "alpha".to_string(), "mid".to_string()],
        );
        assert_eq!(auth.scope_string(), "alpha mid zebra");
    }

    #[test]
    fn test_has_authority() {
        let auth = Authentication::for_user("web", [], "admin")
            .with_authorities(vec![Role::UserAdmin]);
        assert!(auth.has_authority(Role::UserAdmin));
        assert!(!auth.has_authority(Role::ClientAdmin));

        let client = Authentication::client_only("cli", []);
        assert!(!client.has_authority(Role::UserAdmin));
    }

    #[test]
    fn test_serialization_round_trip() {
        let auth = Authentication::for_user("web", ["profile".to_string()], "alice")
            .with_authorities(vec![Role::ClientAdmin]);
        let json = serde_json::to_string(&auth).unwrap();
        let back: Authentication = serde_json::from_str(&json).unwrap();
        assert_eq!(auth, back);
    }
}
