//! Authorization code storage.
//!
//! Single-use is enforced in SQL: redemption is `DELETE ... RETURNING`,
//! the conditional delete that lets exactly one concurrent redeemer win.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;

use tandem_auth::AuthResult;
use tandem_auth::storage::AuthorizationCodeStorage;
use tandem_auth::types::AuthorizationCodeRecord;

use crate::{PgPool, StorageError, StorageResult};

/// PostgreSQL-backed [`AuthorizationCodeStorage`].
pub struct PostgresAuthorizationCodeStorage {
    pool: PgPool,
}

impl PostgresAuthorizationCodeStorage {
    /// Creates the storage over a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_inner(&self, record: &AuthorizationCodeRecord) -> StorageResult<()> {
        let authentication = serde_json::to_value(&record.authentication)?;
        query(r#"INSERT INTO "OAuthCode" ("code", "authentication") VALUES ($1, $2)"#)
            .bind(&record.code)
            .bind(&authentication)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx_core::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return StorageError::conflict("authorization code already exists");
                }
                StorageError::from(e)
            })?;
        Ok(())
    }

    async fn consume_inner(&self, code: &str) -> StorageResult<Option<AuthorizationCodeRecord>> {
        let row: Option<(String, serde_json::Value)> = query_as(
            r#"
            DELETE FROM "OAuthCode"
            WHERE "code" = $1
            RETURNING "code", "authentication"
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(code, authentication)| -> StorageResult<_> {
            Ok(AuthorizationCodeRecord {
                code,
                authentication: serde_json::from_value(authentication)?,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl AuthorizationCodeStorage for PostgresAuthorizationCodeStorage {
    async fn insert(&self, record: &AuthorizationCodeRecord) -> AuthResult<()> {
        self.insert_inner(record).await.map_err(Into::into)
    }

    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCodeRecord>> {
        self.consume_inner(code).await.map_err(Into::into)
    }
}
