//! Ingredient reference table: lookup, staff creation and bulk import

use crate::db::unique_violation;
use crate::error::ApiError;
use crate::repositories::ingredient::NAME_UNIT_CONSTRAINT;
use crate::repositories::{IngredientRecord, IngredientRepository};
use anyhow::Context;
use foodgram_shared::{CreateIngredientRequest, IngredientResponse};
use sqlx::PgPool;
use std::path::Path;
use tracing::{info, warn};
use validator::Validate;

fn to_response(record: IngredientRecord) -> IngredientResponse {
    IngredientResponse {
        id: record.id,
        name: record.name,
        measurement_unit: record.measurement_unit,
    }
}

/// Outcome of an import run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub total: usize,
    pub added: u64,
    pub skipped_invalid: usize,
}

/// Parse a JSON array of `{name, measurement_unit}` objects
///
/// Entries failing validation are dropped and counted.
pub fn parse_ingredients(json: &str) -> anyhow::Result<(Vec<CreateIngredientRequest>, usize)> {
    let items: Vec<CreateIngredientRequest> =
        serde_json::from_str(json).context("expected a JSON array of {name, measurement_unit}")?;

    let total = items.len();
    let valid: Vec<_> = items
        .into_iter()
        .map(|mut item| {
            item.name = item.name.trim().to_string();
            item.measurement_unit = item.measurement_unit.trim().to_string();
            item
        })
        .filter(|item| item.validate().is_ok())
        .collect();
    let skipped = total - valid.len();

    Ok((valid, skipped))
}

pub struct IngredientService;

impl IngredientService {
    /// Ingredients whose name starts with `name` (case-insensitive)
    pub async fn search(pool: &PgPool, name: Option<&str>) -> Result<Vec<IngredientResponse>, ApiError> {
        let records = IngredientRepository::search(pool, name.map(str::trim))
            .await
            .map_err(ApiError::Internal)?;

        Ok(records.into_iter().map(to_response).collect())
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<IngredientResponse, ApiError> {
        IngredientRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .map(to_response)
            .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))
    }

    pub async fn create(pool: &PgPool, req: CreateIngredientRequest) -> Result<IngredientResponse, ApiError> {
        req.validate()?;

        let record = IngredientRepository::create(pool, req.name.trim(), req.measurement_unit.trim())
            .await
            .map_err(|e| match unique_violation(&e).as_deref() {
                Some(NAME_UNIT_CONSTRAINT) => ApiError::Conflict(format!(
                    "Ingredient {} ({}) already exists",
                    req.name, req.measurement_unit
                )),
                _ => ApiError::Internal(e),
            })?;

        info!(ingredient_id = record.id, "Ingredient created");
        Ok(to_response(record))
    }

    /// Load ingredients from a JSON file, skipping pairs already present
    pub async fn import_file(pool: &PgPool, path: &Path) -> anyhow::Result<ImportReport> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read \"{}\"", path.display()))?;

        let (items, skipped_invalid) = parse_ingredients(&contents)
            .with_context(|| format!("failed to parse \"{}\"", path.display()))?;
        if skipped_invalid > 0 {
            warn!(skipped_invalid, "Skipped invalid ingredient entries");
        }

        let (names, units): (Vec<String>, Vec<String>) = items
            .iter()
            .map(|item| (item.name.clone(), item.measurement_unit.clone()))
            .unzip();

        let added = IngredientRepository::import(pool, &names, &units).await?;

        Ok(ImportReport {
            total: items.len() + skipped_invalid,
            added,
            skipped_invalid,
        })
    }
}
