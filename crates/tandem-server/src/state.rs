//! Application state wiring.

use std::sync::Arc;

use axum::extract::FromRef;
use tandem_auth::http::{AdminState, PartnerTokenState, ReciprocalState, TokenEndpointState};
use tandem_auth::middleware::AuthState;
use tandem_auth::storage::{
    AuthorizationCodeStorage, InMemoryStorage, PartnerStorage, PartnerTokenStorage, TokenStorage,
};
use tandem_auth::types::{InMemoryUserDirectory, User};
use tandem_auth::{
    HttpPartnerExchangeClient, OpaqueTokenGranter, PartnerRegistry, PartnerTokenManager,
    PartnerTokenStore, ReciprocalExchange, TokenStore,
};
use tandem_auth_postgres::PostgresAuthStorage;

use crate::config::{ServerConfig, StorageBackend};

/// The storage trait objects every service is built over.
struct StorageSet {
    tokens: Arc<dyn TokenStorage>,
    codes: Arc<dyn AuthorizationCodeStorage>,
    partners: Arc<dyn PartnerStorage>,
    partner_tokens: Arc<dyn PartnerTokenStorage>,
}

async fn build_storage(config: &ServerConfig) -> anyhow::Result<StorageSet> {
    match config.storage.backend {
        StorageBackend::Memory => {
            let storage = Arc::new(InMemoryStorage::new());
            Ok(StorageSet {
                tokens: storage.clone(),
                codes: storage.clone(),
                partners: storage.clone(),
                partner_tokens: storage,
            })
        }
        StorageBackend::Postgres => {
            let database_url = config
                .storage
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("storage.database_url is required for postgres"))?;
            let storage = PostgresAuthStorage::connect(database_url).await?;
            storage.run_migrations().await?;
            Ok(StorageSet {
                tokens: Arc::new(storage.tokens()),
                codes: Arc::new(storage.codes()),
                partners: Arc::new(storage.partners()),
                partner_tokens: Arc::new(storage.partner_tokens()),
            })
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Bearer authentication state.
    pub auth: AuthState,

    /// Partner token endpoint state.
    pub partner_token: PartnerTokenState,

    /// Reciprocal authorization endpoint state.
    pub reciprocal: ReciprocalState,

    /// Token endpoint state.
    pub token_endpoint: TokenEndpointState,

    /// Partner administration state.
    pub admin: AdminState,
}

impl AppState {
    /// Builds the full service graph from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend or the partner HTTP client
    /// cannot be constructed.
    pub async fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let storage = build_storage(config).await?;

        let token_store = Arc::new(TokenStore::new(storage.tokens, storage.codes));
        let registry = Arc::new(PartnerRegistry::new(storage.partners));
        let partner_tokens = Arc::new(PartnerTokenStore::new(storage.partner_tokens));

        let exchange_client =
            Arc::new(HttpPartnerExchangeClient::new(config.auth.partner.clone())?);

        let manager = Arc::new(PartnerTokenManager::new(
            registry.clone(),
            partner_tokens.clone(),
            exchange_client.clone(),
        ));
        let reciprocal = Arc::new(ReciprocalExchange::new(
            registry.clone(),
            partner_tokens,
            exchange_client,
        ));

        let directory = Arc::new(InMemoryUserDirectory::new());
        for user in &config.users {
            directory.insert(User::with_password(
                &user.username,
                &user.password,
                user.authorities.clone(),
            )?);
        }

        let granter = Arc::new(
            OpaqueTokenGranter::new(token_store.clone(), config.auth.tokens.clone())
                .with_user_directory(directory),
        );

        Ok(Self {
            auth: AuthState::new(token_store),
            partner_token: PartnerTokenState::new(manager),
            reciprocal: ReciprocalState::new(reciprocal),
            token_endpoint: TokenEndpointState::new(granter),
            admin: AdminState::new(registry),
        })
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for PartnerTokenState {
    fn from_ref(state: &AppState) -> Self {
        state.partner_token.clone()
    }
}

impl FromRef<AppState> for ReciprocalState {
    fn from_ref(state: &AppState) -> Self {
        state.reciprocal.clone()
    }
}

impl FromRef<AppState> for TokenEndpointState {
    fn from_ref(state: &AppState) -> Self {
        state.token_endpoint.clone()
    }
}

impl FromRef<AppState> for AdminState {
    fn from_ref(state: &AppState) -> Self {
        state.admin.clone()
    }
}
