//! Staff-only overview and moderation

use crate::error::ApiError;
use crate::repositories::AdminRepository;
use foodgram_shared::{AdminRecipeRow, AdminSummary, AdminUserRow};
use sqlx::PgPool;

pub struct AdminService;

impl AdminService {
    pub async fn summary(pool: &PgPool) -> Result<AdminSummary, ApiError> {
        let summary = AdminRepository::summary(pool)
            .await
            .map_err(ApiError::Internal)?;

        Ok(AdminSummary {
            users: summary.users,
            recipes: summary.recipes,
            ingredients: summary.ingredients,
            favorites: summary.favorites,
        })
    }

    pub async fn recipes(pool: &PgPool, search: Option<&str>) -> Result<Vec<AdminRecipeRow>, ApiError> {
        let rows = AdminRepository::recipes(pool, search)
            .await
            .map_err(ApiError::Internal)?;

        Ok(rows
            .into_iter()
            .map(|row| AdminRecipeRow {
                id: row.id,
                name: row.name,
                author: row.author,
                cooking_time: row.cooking_time,
                favorites_count: row.favorites_count,
                pub_date: row.pub_date,
            })
            .collect())
    }

    pub async fn users(pool: &PgPool, search: Option<&str>) -> Result<Vec<AdminUserRow>, ApiError> {
        let rows = AdminRepository::users(pool, search)
            .await
            .map_err(ApiError::Internal)?;

        Ok(rows
            .into_iter()
            .map(|row| AdminUserRow {
                id: row.id,
                email: row.email,
                username: row.username,
                first_name: row.first_name,
                last_name: row.last_name,
                is_staff: row.is_staff,
                recipes_count: row.recipes_count,
                subscribers_count: row.subscribers_count,
            })
            .collect())
    }
}
