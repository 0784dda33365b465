//! Partner token storage.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;

use tandem_auth::AuthResult;
use tandem_auth::storage::PartnerTokenStorage;
use tandem_auth::types::{BearerToken, PartnerTokenRecord};

use crate::{PgPool, StorageError, StorageResult};

/// Partner token row: every column of `"OAuthPartnerToken"`.
type PartnerTokenRow = (String, serde_json::Value, String, String, Option<String>);

fn record_from_row(row: PartnerTokenRow) -> StorageResult<PartnerTokenRecord> {
    let token: BearerToken = serde_json::from_value(row.1)?;
    Ok(PartnerTokenRecord {
        token_id: row.0,
        token,
        authentication_id: row.2,
        client_id: row.3,
        user_name: row.4,
    })
}

/// PostgreSQL-backed [`PartnerTokenStorage`].
pub struct PostgresPartnerTokenStorage {
    pool: PgPool,
}

impl PostgresPartnerTokenStorage {
    /// Creates the storage over a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn put_inner(&self, record: &PartnerTokenRecord) -> StorageResult<()> {
        let token = serde_json::to_value(&record.token)?;
        query(
            r#"
            INSERT INTO "OAuthPartnerToken"
                ("tokenId", "token", "authenticationId", "clientId", "userName")
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT ("tokenId") DO UPDATE SET
                "token" = EXCLUDED."token",
                "authenticationId" = EXCLUDED."authenticationId",
                "clientId" = EXCLUDED."clientId",
                "userName" = EXCLUDED."userName"
            "#,
        )
        .bind(&record.token_id)
        .bind(&token)
        .bind(&record.authentication_id)
        .bind(&record.client_id)
        .bind(&record.user_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_inner(&self, authentication_id: &str) -> StorageResult<Vec<PartnerTokenRecord>> {
        let rows: Vec<PartnerTokenRow> = query_as(
            r#"
            SELECT "tokenId", "token", "authenticationId", "clientId", "userName"
            FROM "OAuthPartnerToken"
            WHERE "authenticationId" = $1
            "#,
        )
        .bind(authentication_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(record_from_row).collect()
    }
}

#[async_trait]
impl PartnerTokenStorage for PostgresPartnerTokenStorage {
    async fn put(&self, record: &PartnerTokenRecord) -> AuthResult<()> {
        self.put_inner(record).await.map_err(Into::into)
    }

    async fn find_by_authentication_id(
        &self,
        authentication_id: &str,
    ) -> AuthResult<Vec<PartnerTokenRecord>> {
        self.find_inner(authentication_id).await.map_err(Into::into)
    }

    async fn delete_batch(&self, token_ids: &[String]) -> AuthResult<()> {
        query(r#"DELETE FROM "OAuthPartnerToken" WHERE "tokenId" = ANY($1)"#)
            .bind(token_ids)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
