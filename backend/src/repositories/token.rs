//! Revoked auth tokens
//!
//! Tokens are stateless JWTs; logout records the token id here until the
//! token would have expired anyway.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct TokenRepository;

impl TokenRepository {
    pub async fn revoke(
        pool: &PgPool,
        jti: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn is_revoked(pool: &PgPool, jti: &str) -> Result<bool> {
        let revoked = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)",
        )
        .bind(jti)
        .fetch_one(pool)
        .await?;

        Ok(revoked)
    }

    /// Drop entries whose tokens have expired
    pub async fn purge_expired(pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
