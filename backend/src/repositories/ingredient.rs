//! Ingredient reference table

use super::escape_like;
use anyhow::Result;
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngredientRecord {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// Unique constraint on `(name, measurement_unit)`
pub const NAME_UNIT_CONSTRAINT: &str = "ingredients_name_unit_key";

pub struct IngredientRepository;

/// Lowercased `LIKE` pattern matching names that start with `prefix`
fn prefix_pattern(prefix: Option<&str>) -> Option<String> {
    prefix
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}%", escape_like(&p.to_lowercase())))
}

impl IngredientRepository {
    /// All ingredients, optionally filtered by a case-insensitive name prefix
    pub async fn search(pool: &PgPool, prefix: Option<&str>) -> Result<Vec<IngredientRecord>> {
        let pattern = prefix_pattern(prefix);

        let records = sqlx::query_as::<_, IngredientRecord>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE $1::TEXT IS NULL OR LOWER(name) LIKE $1
            ORDER BY name, measurement_unit
            "#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<IngredientRecord>> {
        let record = sqlx::query_as::<_, IngredientRecord>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Ids from `ids` with no matching ingredient
    pub async fn missing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>> {
        let missing = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT t.id
            FROM UNNEST($1::BIGINT[]) AS t(id)
            WHERE NOT EXISTS (SELECT 1 FROM ingredients i WHERE i.id = t.id)
            ORDER BY t.id
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(missing)
    }

    pub async fn create(pool: &PgPool, name: &str, measurement_unit: &str) -> Result<IngredientRecord> {
        let record = sqlx::query_as::<_, IngredientRecord>(
            r#"
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            RETURNING id, name, measurement_unit
            "#,
        )
        .bind(name)
        .bind(measurement_unit)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Bulk insert, skipping pairs that already exist. Returns rows added.
    pub async fn import(pool: &PgPool, names: &[String], units: &[String]) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO ingredients (name, measurement_unit)
            SELECT * FROM UNNEST($1::TEXT[], $2::TEXT[])
            ON CONFLICT (name, measurement_unit) DO NOTHING
            "#,
        )
        .bind(names)
        .bind(units)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ingredients")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("Sug"), Some("sug%"))]
    #[case(Some("50%"), Some("50\\%%"))]
    #[case(Some("a_b"), Some("a\\_b%"))]
    fn test_prefix_pattern(#[case] prefix: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(prefix_pattern(prefix).as_deref(), expected);
    }
}
