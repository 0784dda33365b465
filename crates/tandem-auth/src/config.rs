//! Authorization configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root auth configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "https://auth.example.com"
///
/// [auth.tokens]
/// access_token_lifetime = "1h"
/// refresh_token_lifetime = "90d"
///
/// [auth.partner]
/// request_timeout = "30s"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Public base URL of this authorization server.
    pub issuer: String,

    /// Token issuance configuration.
    pub tokens: TokenLifetimeConfig,

    /// Partner token-endpoint client configuration.
    pub partner: PartnerClientConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            tokens: TokenLifetimeConfig::default(),
            partner: PartnerClientConfig::default(),
        }
    }
}

/// Lifetimes for locally issued credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenLifetimeConfig {
    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Whether issued access tokens carry a refresh token.
    pub issue_refresh_tokens: bool,
}

impl Default for TokenLifetimeConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::from_secs(60 * 60),
            refresh_token_lifetime: Duration::from_secs(90 * 24 * 60 * 60),
            issue_refresh_tokens: true,
        }
    }
}

impl TokenLifetimeConfig {
    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }

    /// Sets whether access tokens carry refresh tokens.
    #[must_use]
    pub fn with_issue_refresh_tokens(mut self, issue: bool) -> Self {
        self.issue_refresh_tokens = issue;
        self
    }
}

/// HTTP client settings for partner token endpoints.
///
/// Timeouts live here, on the client, not in the exchange protocol: no
/// store or manager imposes its own deadline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PartnerClientConfig {
    /// Request timeout for partner token-endpoint calls.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Whether to allow plain-HTTP partner endpoints (tests only).
    pub allow_http: bool,
}

impl Default for PartnerClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            allow_http: false,
        }
    }
}

impl PartnerClientConfig {
    /// Sets the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Allows plain-HTTP partner endpoints (tests only).
    #[must_use]
    pub fn with_allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }
}
