//! Access and refresh token storage.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;

use tandem_auth::storage::TokenStorage;
use tandem_auth::types::{AccessTokenRecord, Authentication, BearerToken, RefreshTokenRecord};
use tandem_auth::AuthResult;

use crate::{PgPool, StorageResult};

/// Access token row: every column of `"OAuthAccessToken"`.
type AccessTokenRow = (
    String,
    serde_json::Value,
    String,
    String,
    String,
    serde_json::Value,
    Option<String>,
);

const SELECT_ACCESS_COLUMNS: &str = r#"
    SELECT "tokenId", "token", "authenticationId", "clientId", "userName",
           "authentication", "refreshToken"
    FROM "OAuthAccessToken"
"#;

fn access_record_from_row(row: AccessTokenRow) -> StorageResult<AccessTokenRecord> {
    let token: BearerToken = serde_json::from_value(row.1)?;
    let authentication: Authentication = serde_json::from_value(row.5)?;
    Ok(AccessTokenRecord {
        token_id: row.0,
        token,
        authentication_id: row.2,
        client_id: row.3,
        user_name: row.4,
        authentication,
        refresh_token_id: row.6,
    })
}

/// PostgreSQL-backed [`TokenStorage`].
pub struct PostgresTokenStorage {
    pool: PgPool,
}

impl PostgresTokenStorage {
    /// Creates the storage over a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn put_access_inner(&self, record: &AccessTokenRecord) -> StorageResult<()> {
        let token = serde_json::to_value(&record.token)?;
        let authentication = serde_json::to_value(&record.authentication)?;
        query(
            r#"
            INSERT INTO "OAuthAccessToken"
                ("tokenId", "token", "authenticationId", "clientId", "userName",
                 "authentication", "refreshToken")
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT ("tokenId") DO UPDATE SET
                "token" = EXCLUDED."token",
                "authenticationId" = EXCLUDED."authenticationId",
                "clientId" = EXCLUDED."clientId",
                "userName" = EXCLUDED."userName",
                "authentication" = EXCLUDED."authentication",
                "refreshToken" = EXCLUDED."refreshToken"
            "#,
        )
        .bind(&record.token_id)
        .bind(&token)
        .bind(&record.authentication_id)
        .bind(&record.client_id)
        .bind(&record.user_name)
        .bind(&authentication)
        .bind(&record.refresh_token_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_access_inner(&self, token_id: &str) -> StorageResult<Option<AccessTokenRecord>> {
        let sql = format!(r#"{SELECT_ACCESS_COLUMNS} WHERE "tokenId" = $1"#);
        let row: Option<AccessTokenRow> = query_as(&sql)
            .bind(token_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(access_record_from_row).transpose()
    }

    async fn find_access_inner(
        &self,
        condition: &str,
        binds: &[&str],
    ) -> StorageResult<Vec<AccessTokenRecord>> {
        let sql = format!("{SELECT_ACCESS_COLUMNS} WHERE {condition}");
        let mut q = query_as::<sqlx_postgres::Postgres, AccessTokenRow>(&sql);
        for bind in binds {
            q = q.bind(*bind);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(access_record_from_row).collect()
    }
}

#[async_trait]
impl TokenStorage for PostgresTokenStorage {
    async fn put_access_token(&self, record: &AccessTokenRecord) -> AuthResult<()> {
        self.put_access_inner(record).await.map_err(Into::into)
    }

    async fn get_access_token(&self, token_id: &str) -> AuthResult<Option<AccessTokenRecord>> {
        self.get_access_inner(token_id).await.map_err(Into::into)
    }

    async fn delete_access_token(&self, token_id: &str) -> AuthResult<bool> {
        let result = query(r#"DELETE FROM "OAuthAccessToken" WHERE "tokenId" = $1"#)
            .bind(token_id)
            .execute(&self.pool)
            .await
            .map_err(crate::StorageError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_authentication_id(
        &self,
        authentication_id: &str,
    ) -> AuthResult<Vec<AccessTokenRecord>> {
        self.find_access_inner(r#""authenticationId" = $1"#, &[authentication_id])
            .await
            .map_err(Into::into)
    }

    async fn find_by_refresh_token_id(
        &self,
        refresh_token_id: &str,
    ) -> AuthResult<Vec<AccessTokenRecord>> {
        self.find_access_inner(r#""refreshToken" = $1"#, &[refresh_token_id])
            .await
            .map_err(Into::into)
    }

    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Vec<AccessTokenRecord>> {
        self.find_access_inner(r#""clientId" = $1"#, &[client_id])
            .await
            .map_err(Into::into)
    }

    async fn find_by_client_id_and_user_name(
        &self,
        client_id: &str,
        user_name: &str,
    ) -> AuthResult<Vec<AccessTokenRecord>> {
        self.find_access_inner(
            r#""clientId" = $1 AND "userName" = $2"#,
            &[client_id, user_name],
        )
        .await
        .map_err(Into::into)
    }

    async fn put_refresh_token(&self, record: &RefreshTokenRecord) -> AuthResult<()> {
        let token = serde_json::to_value(&record.token).map_err(crate::StorageError::from)?;
        let authentication =
            serde_json::to_value(&record.authentication).map_err(crate::StorageError::from)?;
        query(
            r#"
            INSERT INTO "OAuthRefreshToken" ("tokenId", "token", "authentication")
            VALUES ($1, $2, $3)
            ON CONFLICT ("tokenId") DO UPDATE SET
                "token" = EXCLUDED."token",
                "authentication" = EXCLUDED."authentication"
            "#,
        )
        .bind(&record.token_id)
        .bind(&token)
        .bind(&authentication)
        .execute(&self.pool)
        .await
        .map_err(crate::StorageError::from)?;
        Ok(())
    }

    async fn get_refresh_token(&self, token_id: &str) -> AuthResult<Option<RefreshTokenRecord>> {
        let row: Option<(String, serde_json::Value, serde_json::Value)> = query_as(
            r#"
            SELECT "tokenId", "token", "authentication"
            FROM "OAuthRefreshToken"
            WHERE "tokenId" = $1
            "#,
        )
        .bind(token_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(crate::StorageError::from)?;

        row.map(|(token_id, token, authentication)| -> StorageResult<_> {
            Ok(RefreshTokenRecord {
                token_id,
                token: serde_json::from_value(token)?,
                authentication: serde_json::from_value(authentication)?,
            })
        })
        .transpose()
        .map_err(Into::into)
    }

    async fn delete_refresh_token(&self, token_id: &str) -> AuthResult<bool> {
        let result = query(r#"DELETE FROM "OAuthRefreshToken" WHERE "tokenId" = $1"#)
            .bind(token_id)
            .execute(&self.pool)
            .await
            .map_err(crate::StorageError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
