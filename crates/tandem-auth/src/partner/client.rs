//! Partner token-endpoint client.
//!
//! The HTTP conversation with a partner's token endpoint: exchanging a
//! reciprocal authorization code for tokens, and refreshing an expired
//! partner token. Defined as a trait so the manager and the reciprocal
//! handler never touch the network in tests.

use async_trait::async_trait;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use url::Url;

use crate::AuthResult;
use crate::config::PartnerClientConfig;
use crate::error::AuthError;
use crate::types::{BearerToken, Partner};

/// Client for a partner's OAuth token endpoint.
#[async_trait]
pub trait PartnerExchangeClient: Send + Sync {
    /// Exchanges an authorization code for a partner access token
    /// (authorization-code grant; the partner imposes no state or PKCE
    /// requirement on this leg).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::PartnerExchangeFailed`] if the endpoint
    /// rejects the exchange or cannot be reached.
    async fn exchange_code(&self, partner: &Partner, code: &str) -> AuthResult<BearerToken>;

    /// Obtains a fresh access token from the stored refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::PartnerRefreshFailed`] if the endpoint
    /// rejects the refresh or cannot be reached.
    async fn refresh(&self, partner: &Partner, refresh_token: &str) -> AuthResult<BearerToken>;
}

/// Wire format of a token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

impl TokenEndpointResponse {
    fn into_bearer_token(self) -> BearerToken {
        BearerToken {
            value: self.access_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at: self
                .expires_in
                .map(|secs| OffsetDateTime::now_utc() + Duration::seconds(secs)),
            scope: self
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            refresh_token: self.refresh_token,
        }
    }
}

/// Wire format of an RFC 6749 error response.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// reqwest-backed [`PartnerExchangeClient`].
pub struct HttpPartnerExchangeClient {
    http_client: reqwest::Client,
    config: PartnerClientConfig,
}

impl HttpPartnerExchangeClient {
    /// Creates a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: PartnerClientConfig) -> AuthResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::configuration(format!("partner http client: {e}")))?;
        Ok(Self {
            http_client,
            config,
        })
    }

    fn token_endpoint(&self, partner: &Partner) -> AuthResult<Url> {
        let url = Url::parse(&partner.access_token_uri).map_err(|e| {
            AuthError::configuration(format!(
                "partner {} has an invalid token endpoint: {e}",
                partner.partner_id
            ))
        })?;
        if url.scheme() != "https" && !self.config.allow_http {
            return Err(AuthError::configuration(format!(
                "partner {} token endpoint is not https",
                partner.partner_id
            )));
        }
        Ok(url)
    }

    async fn post_token_request(
        &self,
        partner: &Partner,
        params: &[(&str, &str)],
    ) -> Result<BearerToken, String> {
        let endpoint = self
            .token_endpoint(partner)
            .map_err(|e| e.to_string())?;

        debug!(partner_id = %partner.partner_id, %endpoint, "calling partner token endpoint");

        let response = self
            .http_client
            .post(endpoint)
            .basic_auth(&partner.client_id, Some(&partner.client_secret))
            .form(params)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if let Ok(oauth_error) = serde_json::from_str::<OAuthErrorResponse>(&body) {
                return Err(format!(
                    "{} - {}",
                    oauth_error.error,
                    oauth_error.error_description.unwrap_or_default()
                ));
            }
            return Err(format!("HTTP {status} - {body}"));
        }

        let token_response: TokenEndpointResponse = response
            .json()
            .await
            .map_err(|e| format!("malformed token response: {e}"))?;

        Ok(token_response.into_bearer_token())
    }
}

#[async_trait]
impl PartnerExchangeClient for HttpPartnerExchangeClient {
    async fn exchange_code(&self, partner: &Partner, code: &str) -> AuthResult<BearerToken> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", partner.client_id.as_str()),
        ];
        if let Some(redirect_uri) = partner.pre_established_redirect_uri.as_deref() {
            params.push(("redirect_uri", redirect_uri));
        }

        self.post_token_request(partner, &params)
            .await
            .map_err(|message| AuthError::partner_exchange_failed(&partner.partner_id, message))
    }

    async fn refresh(&self, partner: &Partner, refresh_token: &str) -> AuthResult<BearerToken> {
        let params = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", partner.client_id.as_str()),
        ];

        self.post_token_request(partner, &params)
            .await
            .map_err(|message| AuthError::partner_refresh_failed(&partner.partner_id, message))
    }
}
