//! Recipe repository for database operations
//!
//! Ingredient rows are written with `UNNEST` so that a recipe and its whole
//! ingredient set land in one transaction with a single insert.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

/// Recipe record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeRecord {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
}

/// Ingredient line joined with the ingredient reference table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeIngredientRecord {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Ingredient id and amount pairs
#[derive(Debug, Clone, Default)]
pub struct IngredientLines {
    pub ids: Vec<i64>,
    pub amounts: Vec<i32>,
}

impl<'a> FromIterator<&'a foodgram_shared::IngredientAmount> for IngredientLines {
    fn from_iter<I: IntoIterator<Item = &'a foodgram_shared::IngredientAmount>>(iter: I) -> Self {
        let (ids, amounts) = iter.into_iter().map(|line| (line.id, line.amount)).unzip();
        Self { ids, amounts }
    }
}

/// Input for creating a recipe
#[derive(Debug, Clone)]
pub struct CreateRecipe {
    pub author_id: i64,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub ingredients: IngredientLines,
}

/// Partial recipe update; the ingredient set is always replaced
#[derive(Debug, Clone)]
pub struct UpdateRecipe {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: IngredientLines,
}

/// Feed filters; `None` disables a filter
///
/// `favorited` and `in_cart` are relative to `viewer_id` and select either
/// side of the flag, so `Some(false)` keeps recipes the viewer has not saved.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeFilter {
    pub author_id: Option<i64>,
    pub viewer_id: Option<i64>,
    pub favorited: Option<bool>,
    pub in_cart: Option<bool>,
}

const RECIPE_COLUMNS: &str = "r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.pub_date";

const FILTER_CLAUSE: &str = r#"
    ($1::BIGINT IS NULL OR r.author_id = $1)
    AND ($3::BOOLEAN IS NULL OR EXISTS (
        SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = $2) = $3)
    AND ($4::BOOLEAN IS NULL OR EXISTS (
        SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = $2) = $4)
"#;

/// Recipe repository for database operations
pub struct RecipeRepository;

impl RecipeRepository {
    /// Page of the recipe feed, newest first
    pub async fn list(
        pool: &PgPool,
        filter: RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RecipeRecord>> {
        let records = sqlx::query_as::<_, RecipeRecord>(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}
            FROM recipes r
            WHERE {FILTER_CLAUSE}
            ORDER BY r.pub_date DESC, r.id DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(filter.author_id)
        .bind(filter.viewer_id)
        .bind(filter.favorited)
        .bind(filter.in_cart)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn count(pool: &PgPool, filter: RecipeFilter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM recipes r WHERE {FILTER_CLAUSE}"
        ))
        .bind(filter.author_id)
        .bind(filter.viewer_id)
        .bind(filter.favorited)
        .bind(filter.in_cart)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<RecipeRecord>> {
        let record = sqlx::query_as::<_, RecipeRecord>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM recipes WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Ingredient lines of several recipes, in insertion order
    pub async fn ingredients_for(
        pool: &PgPool,
        recipe_ids: &[i64],
    ) -> Result<Vec<RecipeIngredientRecord>> {
        let records = sqlx::query_as::<_, RecipeIngredientRecord>(
            r#"
            SELECT ri.recipe_id, ri.ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY ri.id
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Recipes of several authors, newest first
    pub async fn by_authors(pool: &PgPool, author_ids: &[i64]) -> Result<Vec<RecipeRecord>> {
        let records = sqlx::query_as::<_, RecipeRecord>(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}
            FROM recipes r
            WHERE r.author_id = ANY($1)
            ORDER BY r.pub_date DESC, r.id DESC
            "#
        ))
        .bind(author_ids)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Recipe totals per author
    pub async fn count_by_authors(pool: &PgPool, author_ids: &[i64]) -> Result<Vec<(i64, i64)>> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT author_id, COUNT(*)
            FROM recipes
            WHERE author_id = ANY($1)
            GROUP BY author_id
            "#,
        )
        .bind(author_ids)
        .fetch_all(pool)
        .await?;

        Ok(counts)
    }

    /// Create a recipe together with its ingredient lines
    pub async fn create(pool: &PgPool, input: CreateRecipe) -> Result<RecipeRecord> {
        let mut tx = pool.begin().await?;

        let record = sqlx::query_as::<_, RecipeRecord>(
            r#"
            INSERT INTO recipes (author_id, name, image, text, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, name, image, text, cooking_time, pub_date
            "#,
        )
        .bind(input.author_id)
        .bind(&input.name)
        .bind(&input.image)
        .bind(&input.text)
        .bind(input.cooking_time)
        .fetch_one(&mut *tx)
        .await?;

        insert_lines(&mut tx, record.id, &input.ingredients).await?;
        tx.commit().await?;

        Ok(record)
    }

    /// Apply an update and replace the ingredient set
    ///
    /// Returns `None` when the recipe does not exist.
    pub async fn update(pool: &PgPool, id: i64, input: UpdateRecipe) -> Result<Option<RecipeRecord>> {
        let mut tx = pool.begin().await?;

        let record = sqlx::query_as::<_, RecipeRecord>(
            r#"
            UPDATE recipes SET
                name = COALESCE($2, name),
                image = COALESCE($3, image),
                text = COALESCE($4, text),
                cooking_time = COALESCE($5, cooking_time)
            WHERE id = $1
            RETURNING id, author_id, name, image, text, cooking_time, pub_date
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.image)
        .bind(&input.text)
        .bind(input.cooking_time)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_lines(&mut tx, id, &input.ingredients).await?;

        tx.commit().await?;

        Ok(Some(record))
    }

    /// Delete a recipe, returning its image path
    pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<String>> {
        let image = sqlx::query_scalar::<_, String>(
            "DELETE FROM recipes WHERE id = $1 RETURNING image",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(image)
    }
}

async fn insert_lines(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i64,
    lines: &IngredientLines,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
        SELECT $1, t.ingredient_id, t.amount
        FROM UNNEST($2::BIGINT[], $3::INTEGER[]) AS t(ingredient_id, amount)
        "#,
    )
    .bind(recipe_id)
    .bind(&lines.ids)
    .bind(&lines.amounts)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodgram_shared::IngredientAmount;

    #[test]
    fn test_ingredient_lines_keep_order() {
        let payload = vec![
            IngredientAmount { id: 9, amount: 200 },
            IngredientAmount { id: 3, amount: 1 },
        ];
        let lines: IngredientLines = payload.iter().collect();
        assert_eq!(lines.ids, vec![9, 3]);
        assert_eq!(lines.amounts, vec![200, 1]);
    }
}
