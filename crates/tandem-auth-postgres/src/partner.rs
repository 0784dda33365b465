//! Partner registration storage.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;

use tandem_auth::AuthResult;
use tandem_auth::storage::PartnerStorage;
use tandem_auth::types::Partner;

use crate::{PgPool, StorageError, StorageResult};

/// PostgreSQL-backed [`PartnerStorage`].
pub struct PostgresPartnerStorage {
    pool: PgPool,
}

impl PostgresPartnerStorage {
    /// Creates the storage over a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn get_inner(&self, partner_id: &str) -> StorageResult<Option<Partner>> {
        let row: Option<(serde_json::Value,)> =
            query_as(r#"SELECT "partner" FROM "OAuthPartner" WHERE "partnerId" = $1"#)
                .bind(partner_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|(value,)| serde_json::from_value(value).map_err(StorageError::from))
            .transpose()
    }

    async fn list_inner(&self) -> StorageResult<Vec<Partner>> {
        let rows: Vec<(serde_json::Value,)> =
            query_as(r#"SELECT "partner" FROM "OAuthPartner""#)
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter()
            .map(|(value,)| serde_json::from_value(value).map_err(StorageError::from))
            .collect()
    }

    async fn put_inner(&self, partner: &Partner) -> StorageResult<()> {
        let value = serde_json::to_value(partner)?;
        query(
            r#"
            INSERT INTO "OAuthPartner" ("partnerId", "partner")
            VALUES ($1, $2)
            ON CONFLICT ("partnerId") DO UPDATE SET "partner" = EXCLUDED."partner"
            "#,
        )
        .bind(&partner.partner_id)
        .bind(&value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PartnerStorage for PostgresPartnerStorage {
    async fn get(&self, partner_id: &str) -> AuthResult<Option<Partner>> {
        self.get_inner(partner_id).await.map_err(Into::into)
    }

    async fn list(&self) -> AuthResult<Vec<Partner>> {
        self.list_inner().await.map_err(Into::into)
    }

    async fn put(&self, partner: &Partner) -> AuthResult<()> {
        self.put_inner(partner).await.map_err(Into::into)
    }

    async fn delete(&self, partner_id: &str) -> AuthResult<bool> {
        let result = query(r#"DELETE FROM "OAuthPartner" WHERE "partnerId" = $1"#)
            .bind(partner_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
