//! Authorization server error types.
//!
//! This module defines all error types that can occur while storing,
//! looking up, or exchanging OAuth credentials.

use std::fmt;

/// Errors that can occur during token storage and partner exchange operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The client or partner identifier is unknown or not registered.
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client is invalid.
        message: String,
    },

    /// The partner identifier does not resolve to a registered partner.
    #[error("Unknown partner: {partner_id}")]
    UnknownPartner {
        /// The unresolved partner identifier.
        partner_id: String,
    },

    /// No token record exists for the requested token value.
    #[error("Token not found")]
    TokenNotFound,

    /// No partner token has been stored for the given user and partner.
    #[error("No partner token for user: {user_id}")]
    NoTokenForUser {
        /// The local user identifier.
        user_id: String,
    },

    /// The authorization grant or refresh token is invalid, expired, or consumed.
    #[error("Invalid grant: {message}")]
    InvalidGrant {
        /// Description of why the grant is invalid.
        message: String,
    },

    /// Exchanging an authorization code at the partner token endpoint failed.
    #[error("Partner exchange failed: {partner_id} - {message}")]
    PartnerExchangeFailed {
        /// The partner whose token endpoint rejected the exchange.
        partner_id: String,
        /// Description of the failure.
        message: String,
    },

    /// Refreshing an expired partner token failed. The stale record is
    /// retained for inspection, never deleted on this path.
    #[error("Partner refresh failed: {partner_id} - {message}")]
    PartnerRefreshFailed {
        /// The partner whose token endpoint rejected the refresh.
        partner_id: String,
        /// Description of the failure.
        message: String,
    },

    /// The authorization server does not support the requested grant type.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType {
        /// The unsupported grant type.
        grant_type: String,
    },

    /// The request lacks valid authentication credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of why the request is unauthorized.
        message: String,
    },

    /// The authenticated principal does not have the required authority.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of why access is forbidden.
        message: String,
    },

    /// An authorization code collided with an existing record. Codes are
    /// caller-random, so this indicates an invariant violation rather than
    /// a client error.
    #[error("Duplicate authorization code")]
    DuplicateCode,

    /// The backing store failed transiently. Never retried internally;
    /// retry policy belongs to the storage client configuration.
    #[error("Storage unavailable: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }

    /// Creates a new `UnknownPartner` error.
    #[must_use]
    pub fn unknown_partner(partner_id: impl Into<String>) -> Self {
        Self::UnknownPartner {
            partner_id: partner_id.into(),
        }
    }

    /// Creates a new `NoTokenForUser` error.
    #[must_use]
    pub fn no_token_for_user(user_id: impl Into<String>) -> Self {
        Self::NoTokenForUser {
            user_id: user_id.into(),
        }
    }

    /// Creates a new `InvalidGrant` error.
    #[must_use]
    pub fn invalid_grant(message: impl Into<String>) -> Self {
        Self::InvalidGrant {
            message: message.into(),
        }
    }

    /// Creates a new `PartnerExchangeFailed` error.
    #[must_use]
    pub fn partner_exchange_failed(
        partner_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::PartnerExchangeFailed {
            partner_id: partner_id.into(),
            message: message.into(),
        }
    }

    /// Creates a new `PartnerRefreshFailed` error.
    #[must_use]
    pub fn partner_refresh_failed(
        partner_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::PartnerRefreshFailed {
            partner_id: partner_id.into(),
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedGrantType` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidClient { .. }
                | Self::UnknownPartner { .. }
                | Self::TokenNotFound
                | Self::NoTokenForUser { .. }
                | Self::InvalidGrant { .. }
                | Self::UnsupportedGrantType { .. }
                | Self::Unauthorized { .. }
                | Self::Forbidden { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::PartnerExchangeFailed { .. }
                | Self::PartnerRefreshFailed { .. }
                | Self::DuplicateCode
                | Self::Storage { .. }
                | Self::Configuration { .. }
                | Self::Internal { .. }
        )
    }

    /// Returns `true` if the failure originated at a partner token endpoint.
    #[must_use]
    pub fn is_partner_error(&self) -> bool {
        matches!(
            self,
            Self::PartnerExchangeFailed { .. } | Self::PartnerRefreshFailed { .. }
        )
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidClient { .. } => ErrorCategory::Authentication,
            Self::UnknownPartner { .. } => ErrorCategory::Partner,
            Self::TokenNotFound => ErrorCategory::Token,
            Self::NoTokenForUser { .. } => ErrorCategory::Partner,
            Self::InvalidGrant { .. } => ErrorCategory::Authentication,
            Self::PartnerExchangeFailed { .. } => ErrorCategory::Partner,
            Self::PartnerRefreshFailed { .. } => ErrorCategory::Partner,
            Self::UnsupportedGrantType { .. } => ErrorCategory::Validation,
            Self::Unauthorized { .. } => ErrorCategory::Authentication,
            Self::Forbidden { .. } => ErrorCategory::Authorization,
            Self::DuplicateCode => ErrorCategory::Internal,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidClient { .. } => "invalid_client",
            Self::UnknownPartner { .. } => "invalid_client",
            Self::TokenNotFound => "invalid_token",
            Self::NoTokenForUser { .. } => "invalid_grant",
            Self::InvalidGrant { .. } => "invalid_grant",
            Self::PartnerExchangeFailed { .. } => "server_error",
            Self::PartnerRefreshFailed { .. } => "server_error",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "access_denied",
            Self::DuplicateCode => "server_error",
            Self::Storage { .. } => "temporarily_unavailable",
            Self::Configuration { .. } => "server_error",
            Self::Internal { .. } => "server_error",
        }
    }
}

/// Categories of auth errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Authentication-related errors (identity verification).
    Authentication,
    /// Authorization-related errors (authority checks).
    Authorization,
    /// Token lookup errors.
    Token,
    /// Partner registry and partner endpoint errors.
    Partner,
    /// Request validation errors.
    Validation,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal invariant violations.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Authorization => write!(f, "authorization"),
            Self::Token => write!(f, "token"),
            Self::Partner => write!(f, "partner"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
