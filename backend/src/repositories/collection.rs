//! Per-user recipe collections: favorites and the shopping cart
//!
//! Both tables have the same `(user_id, recipe_id)` shape, so one set of
//! queries serves both, parameterized by [`RecipeCollection`].

use anyhow::Result;
use sqlx::PgPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeCollection {
    Favorites,
    ShoppingCart,
}

impl RecipeCollection {
    fn table(&self) -> &'static str {
        match self {
            RecipeCollection::Favorites => "favorites",
            RecipeCollection::ShoppingCart => "shopping_cart",
        }
    }

    /// Human-readable name for error messages
    pub fn label(&self) -> &'static str {
        match self {
            RecipeCollection::Favorites => "favorites",
            RecipeCollection::ShoppingCart => "shopping cart",
        }
    }
}

/// One aggregated shopping list line
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShoppingItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

pub struct CollectionRepository;

impl CollectionRepository {
    /// Add a recipe; `false` if it was already there
    pub async fn add(
        pool: &PgPool,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool> {
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO {} (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, recipe_id) DO NOTHING
            "#,
            collection.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a recipe; `false` if it was not there
    pub async fn remove(
        pool: &PgPool,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            collection.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Which of `recipe_ids` the user has in the collection
    pub async fn contained(
        pool: &PgPool,
        collection: RecipeCollection,
        user_id: i64,
        recipe_ids: &[i64],
    ) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT recipe_id FROM {} WHERE user_id = $1 AND recipe_id = ANY($2)",
            collection.table()
        ))
        .bind(user_id)
        .bind(recipe_ids)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Sum of ingredient amounts across the user's cart, grouped by name and unit
    pub async fn shopping_items(pool: &PgPool, user_id: i64) -> Result<Vec<ShoppingItem>> {
        let items = sqlx::query_as::<_, ShoppingItem>(
            r#"
            SELECT i.name, i.measurement_unit, SUM(ri.amount)::BIGINT AS amount
            FROM shopping_cart c
            JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE c.user_id = $1
            GROUP BY i.name, i.measurement_unit
            ORDER BY i.name, i.measurement_unit
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Names of the recipes in the user's cart
    pub async fn cart_recipe_names(pool: &PgPool, user_id: i64) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM shopping_cart c
            JOIN recipes r ON r.id = c.recipe_id
            WHERE c.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collections_use_distinct_tables() {
        assert_eq!(RecipeCollection::Favorites.table(), "favorites");
        assert_eq!(RecipeCollection::ShoppingCart.table(), "shopping_cart");
        assert_eq!(RecipeCollection::ShoppingCart.label(), "shopping cart");
    }
}
