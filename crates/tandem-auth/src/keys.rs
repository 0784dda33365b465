//! Lookup-key derivation.
//!
//! Tokens are persisted under content-addressed keys, and correlated to
//! the authentication that produced them through a deterministic
//! fingerprint. Both derivations are pure, unsalted SHA-256 digests:
//! the same input yields the same key on every process and instance, which
//! is what makes them usable as cross-instance lookup keys in a shared
//! store.

use sha2::{Digest, Sha256};

use crate::types::{Authentication, PartnerResource};

/// Derives the storage key for a token value.
///
/// Returns `None` for an empty value: an absent token maps to an absent
/// record, not an error.
#[must_use]
pub fn extract_token_key(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    Some(digest(value.as_bytes()))
}

/// Derives the authentication fingerprint for a locally issued grant.
///
/// The fingerprint combines the issuing client, the granted scopes in
/// sorted order, and the principal name. Client-only grants omit the
/// principal entirely, so a client-credentials token and a user token for
/// the same client never collide.
#[must_use]
pub fn authentication_key(authentication: &Authentication) -> String {
    let mut entries = vec![
        ("client_id", authentication.client_id.clone()),
        ("scope", authentication.scope_string()),
    ];
    if let Some(username) = authentication.name() {
        entries.push(("username", username.to_string()));
    }
    digest_entries(&entries)
}

/// Derives the fingerprint correlating a partner token to the
/// (partner resource, local authentication) pair that obtained it.
///
/// The partner-side client id and scope identify the resource; the local
/// principal name ties the token to a user. The scope keeps the partner's
/// configured order-insensitive form (sorted) so re-ordering scopes in the
/// registry does not orphan stored tokens.
#[must_use]
pub fn partner_token_key(
    resource: &PartnerResource,
    authentication: Option<&Authentication>,
) -> String {
    let mut scope = resource.scope.clone();
    scope.sort();

    let mut entries = vec![
        ("client_id", resource.client_id.clone()),
        ("scope", scope.join(" ")),
    ];
    if let Some(username) = authentication.and_then(Authentication::name) {
        entries.push(("username", username.to_string()));
    }
    digest_entries(&entries)
}

fn digest_entries(entries: &[(&str, String)]) -> String {
    let canonical = entries
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    digest(canonical.as_bytes())
}

fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_key_is_deterministic() {
        let a = extract_token_key("token-value").unwrap();
        let b = extract_token_key("token-value").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, extract_token_key("other-value").unwrap());
    }

    #[test]
    fn test_empty_token_has_no_key() {
        assert_eq!(extract_token_key(""), None);
    }

    #[test]
    fn test_authentication_key_is_scope_order_insensitive() {
        let a = Authentication::for_user(
            "web",
            ["read".to_string(), "write".to_string()],
            "alice",
        );
        let b = Authentication::for_user(
            "web",
            ["write".to_string(), "read".to_string()],
            "alice",
        );
        assert_eq!(authentication_key(&a), authentication_key(&b));
    }

    #[test]
    fn test_authentication_key_distinguishes_principals() {
        let alice = Authentication::for_user("web", [], "alice");
        let bob = Authentication::for_user("web", [], "bob");
        let client = Authentication::client_only("web", []);

        let keys = [
            authentication_key(&alice),
            authentication_key(&bob),
            authentication_key(&client),
        ];
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[0], keys[2]);
        assert_ne!(keys[1], keys[2]);
    }

    #[test]
    fn test_partner_token_key_uses_resource_identity() {
        let resource = PartnerResource {
            id: "alexa".to_string(),
            client_id: "partner-client".to_string(),
            scope: vec!["b".to_string(), "a".to_string()],
        };
        let auth = Authentication::user_id("alice");

        let key = partner_token_key(&resource, Some(&auth));
        assert_eq!(key, partner_token_key(&resource, Some(&auth)));

        // Scope order in the registry does not change the key.
        let reordered = PartnerResource {
            scope: vec!["a".to_string(), "b".to_string()],
            ..resource.clone()
        };
        assert_eq!(key, partner_token_key(&reordered, Some(&auth)));

        // A different user gets a different key.
        let other = Authentication::user_id("bob");
        assert_ne!(key, partner_token_key(&resource, Some(&other)));

        // No authentication at all is still a valid (client-scoped) key.
        assert_ne!(key, partner_token_key(&resource, None));
    }

    #[test]
    fn test_synthetic_user_id_matches_full_authentication_with_same_name() {
        // The partner token fingerprint only takes the principal name from
        // the authentication, so a synthetic user-id lookup finds tokens
        // stored under a fuller authentication for the same user.
        let resource = PartnerResource {
            id: "alexa".to_string(),
            client_id: "partner-client".to_string(),
            scope: vec!["profile".to_string()],
        };
        let synthetic = Authentication::user_id("alice");
        let full = Authentication::for_user("web", ["read".to_string()], "alice");

        assert_eq!(
            partner_token_key(&resource, Some(&synthetic)),
            partner_token_key(&resource, Some(&full))
        );
    }
}
