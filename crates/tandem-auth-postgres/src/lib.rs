//! PostgreSQL storage backend for tandem-auth.
//!
//! Provides persistent storage for:
//!
//! - Access and refresh tokens (`"OAuthAccessToken"`, `"OAuthRefreshToken"`)
//! - One-time authorization codes (`"OAuthCode"`)
//! - Partner registrations (`"OAuthPartner"`)
//! - Partner-issued tokens (`"OAuthPartnerToken"`)
//!
//! Table and column identifiers are quoted to preserve the logical schema
//! names of the original deployment. Postgres index names are
//! schema-scoped, not table-scoped, so the logical index names carry a
//! table prefix (`"OAuthAccessToken.authenticationId-index"`).
//!
//! Token and authentication blobs are stored as JSONB, so the store stays
//! portable and inspectable.
//!
//! # Example
//!
//! ```ignore
//! use tandem_auth_postgres::PostgresAuthStorage;
//!
//! let storage = PostgresAuthStorage::connect("postgres://localhost/tandem").await?;
//! storage.run_migrations().await?;
//! let tokens = storage.tokens();
//! ```

pub mod code;
pub mod partner;
pub mod partner_token;
pub mod token;

use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

pub use code::PostgresAuthorizationCodeStorage;
pub use partner::PostgresPartnerStorage;
pub use partner_token::PostgresPartnerTokenStorage;
pub use token::PostgresTokenStorage;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// A unique constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Create a `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Returns `true` if this is a unique-violation conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for tandem_auth::AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            // The only unique constraints in the schema guard one-time
            // authorization codes.
            StorageError::Conflict(_) => tandem_auth::AuthError::DuplicateCode,
            other => tandem_auth::AuthError::storage(other.to_string()),
        }
    }
}

/// DDL statements, applied in order and individually idempotent.
const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS "OAuthAccessToken" (
        "tokenId" TEXT PRIMARY KEY,
        "token" JSONB NOT NULL,
        "authenticationId" TEXT NOT NULL,
        "clientId" TEXT NOT NULL,
        "userName" TEXT NOT NULL,
        "authentication" JSONB NOT NULL,
        "refreshToken" TEXT
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS "OAuthAccessToken.authenticationId-index"
        ON "OAuthAccessToken" ("authenticationId")
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS "OAuthAccessToken.clientId-userName-index"
        ON "OAuthAccessToken" ("clientId", "userName")
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS "OAuthAccessToken.refreshToken-index"
        ON "OAuthAccessToken" ("refreshToken")
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "OAuthRefreshToken" (
        "tokenId" TEXT PRIMARY KEY,
        "token" JSONB NOT NULL,
        "authentication" JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "OAuthCode" (
        "code" TEXT PRIMARY KEY,
        "authentication" JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "OAuthPartner" (
        "partnerId" TEXT PRIMARY KEY,
        "partner" JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "OAuthPartnerToken" (
        "tokenId" TEXT PRIMARY KEY,
        "token" JSONB NOT NULL,
        "authenticationId" TEXT NOT NULL,
        "clientId" TEXT NOT NULL,
        "userName" TEXT
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS "OAuthPartnerToken.authenticationId-index"
        ON "OAuthPartnerToken" ("authenticationId")
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS "OAuthPartnerToken.clientId-userName-index"
        ON "OAuthPartnerToken" ("clientId", "userName")
    "#,
];

/// PostgreSQL-backed storage for every tandem-auth record kind.
#[derive(Clone)]
pub struct PostgresAuthStorage {
    pool: PgPool,
}

impl PostgresAuthStorage {
    /// Connects to the database and creates the storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let pool = sqlx_postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the schema. Safe to run on every startup.
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails.
    pub async fn run_migrations(&self) -> StorageResult<()> {
        for statement in MIGRATIONS {
            sqlx_core::query::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("auth schema migrations applied");
        Ok(())
    }

    /// Access/refresh token storage over this pool.
    #[must_use]
    pub fn tokens(&self) -> PostgresTokenStorage {
        PostgresTokenStorage::new(self.pool.clone())
    }

    /// Authorization code storage over this pool.
    #[must_use]
    pub fn codes(&self) -> PostgresAuthorizationCodeStorage {
        PostgresAuthorizationCodeStorage::new(self.pool.clone())
    }

    /// Partner registration storage over this pool.
    #[must_use]
    pub fn partners(&self) -> PostgresPartnerStorage {
        PostgresPartnerStorage::new(self.pool.clone())
    }

    /// Partner token storage over this pool.
    #[must_use]
    pub fn partner_tokens(&self) -> PostgresPartnerTokenStorage {
        PostgresPartnerTokenStorage::new(self.pool.clone())
    }
}
