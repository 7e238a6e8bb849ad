//! Read models for the staff surface

use super::escape_like;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SummaryRecord {
    pub users: i64,
    pub recipes: i64,
    pub ingredients: i64,
    pub favorites: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRecipeRecord {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub cooking_time: i32,
    pub favorites_count: i64,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminUserRecord {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub recipes_count: i64,
    pub subscribers_count: i64,
}

fn contains_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(s)))
}

pub struct AdminRepository;

impl AdminRepository {
    pub async fn summary(pool: &PgPool) -> Result<SummaryRecord> {
        let summary = sqlx::query_as::<_, SummaryRecord>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM recipes) AS recipes,
                (SELECT COUNT(*) FROM ingredients) AS ingredients,
                (SELECT COUNT(*) FROM favorites) AS favorites
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(summary)
    }

    /// Recipes whose name or author username contains `search`
    pub async fn recipes(pool: &PgPool, search: Option<&str>) -> Result<Vec<AdminRecipeRecord>> {
        let records = sqlx::query_as::<_, AdminRecipeRecord>(
            r#"
            SELECT r.id, r.name, u.username AS author, r.cooking_time, r.pub_date,
                   (SELECT COUNT(*) FROM favorites f WHERE f.recipe_id = r.id) AS favorites_count
            FROM recipes r
            JOIN users u ON u.id = r.author_id
            WHERE $1::TEXT IS NULL OR r.name ILIKE $1 OR u.username ILIKE $1
            ORDER BY r.pub_date DESC, r.id DESC
            "#,
        )
        .bind(contains_pattern(search))
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Users whose email or username contains `search`
    pub async fn users(pool: &PgPool, search: Option<&str>) -> Result<Vec<AdminUserRecord>> {
        let records = sqlx::query_as::<_, AdminUserRecord>(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.is_staff,
                   (SELECT COUNT(*) FROM recipes r WHERE r.author_id = u.id) AS recipes_count,
                   (SELECT COUNT(*) FROM subscriptions s WHERE s.author_id = u.id) AS subscribers_count
            FROM users u
            WHERE $1::TEXT IS NULL OR u.email ILIKE $1 OR u.username ILIKE $1
            ORDER BY u.username
            "#,
        )
        .bind(contains_pattern(search))
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_search_disables_filter() {
        assert_eq!(contains_pattern(None), None);
        assert_eq!(contains_pattern(Some("  ")), None);
        assert_eq!(contains_pattern(Some("soup")), Some("%soup%".to_string()));
    }
}
