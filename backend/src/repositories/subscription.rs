//! Subscriptions between users and the authors they follow

use super::user::UserRecord;
use anyhow::Result;
use sqlx::PgPool;

pub struct SubscriptionRepository;

impl SubscriptionRepository {
    /// Subscribe; `false` if the subscription already existed
    pub async fn create(pool: &PgPool, user_id: i64, author_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, author_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, user_id: i64, author_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Which of `author_ids` the user follows
    pub async fn followed_among(pool: &PgPool, user_id: i64, author_ids: &[i64]) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT author_id FROM subscriptions WHERE user_id = $1 AND author_id = ANY($2)",
        )
        .bind(user_id)
        .bind(author_ids)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Page of followed authors ordered by username
    pub async fn authors(
        pool: &PgPool,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserRecord>> {
        let authors = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.password_hash,
                   u.avatar, u.is_staff, u.created_at, u.updated_at
            FROM subscriptions s
            JOIN users u ON u.id = s.author_id
            WHERE s.user_id = $1
            ORDER BY u.username
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(authors)
    }

    pub async fn count_authors(pool: &PgPool, user_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
