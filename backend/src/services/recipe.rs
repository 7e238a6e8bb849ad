//! Recipe service
//!
//! Publishing, editing and listing recipes, plus the favorites and shopping
//! cart collections. Listings are assembled with batched lookups: one query
//! each for authors, ingredient lines and the viewer's flags.

use crate::error::ApiError;
use crate::repositories::{
    CollectionRepository, CreateRecipe, IngredientLines, IngredientRepository, RecipeCollection,
    RecipeFilter, RecipeRecord, RecipeRepository, UpdateRecipe, UserRepository,
};
use crate::services::media::{MediaKind, MediaStorage};
use crate::services::user::UserService;
use foodgram_shared::validation::{validate_cooking_time, validate_ingredient_amounts};
use foodgram_shared::{
    CreateRecipeRequest, IngredientAmount, LimitOffset, RecipeIngredientResponse, RecipeResponse,
    ShortRecipe, UpdateRecipeRequest, UserResponse,
};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};
use validator::Validate;

/// Compact representation used by collections and subscriptions
pub fn short_recipe(media: &MediaStorage, recipe: &RecipeRecord) -> ShortRecipe {
    ShortRecipe {
        id: recipe.id,
        name: recipe.name.clone(),
        image: media.url(&recipe.image),
        cooking_time: recipe.cooking_time,
    }
}

/// Recipe service
pub struct RecipeService;

impl RecipeService {
    /// Page of the recipe feed
    pub async fn list(
        pool: &PgPool,
        media: &MediaStorage,
        viewer: Option<i64>,
        filter: RecipeFilter,
        window: LimitOffset,
    ) -> Result<(Vec<RecipeResponse>, i64), ApiError> {
        let count = RecipeRepository::count(pool, filter)
            .await
            .map_err(ApiError::Internal)?;
        let records = RecipeRepository::list(pool, filter, window.limit, window.offset)
            .await
            .map_err(ApiError::Internal)?;

        Ok((Self::present(pool, media, viewer, records).await?, count))
    }

    pub async fn find(pool: &PgPool, id: i64) -> Result<RecipeRecord, ApiError> {
        RecipeRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))
    }

    pub async fn get(
        pool: &PgPool,
        media: &MediaStorage,
        viewer: Option<i64>,
        id: i64,
    ) -> Result<RecipeResponse, ApiError> {
        let record = Self::find(pool, id).await?;
        Self::present_one(pool, media, viewer, record).await
    }

    /// Publish a recipe
    pub async fn create(
        pool: &PgPool,
        media: &MediaStorage,
        author_id: i64,
        req: CreateRecipeRequest,
    ) -> Result<RecipeResponse, ApiError> {
        req.validate()?;
        Self::validate_ingredients(pool, &req.ingredients).await?;
        validate_cooking_time(req.cooking_time)?;
        if req.image.trim().is_empty() {
            return Err(ApiError::field("image", "This field is required."));
        }

        let image = media.save(MediaKind::Recipe, &req.image).await?;

        let input = CreateRecipe {
            author_id,
            name: req.name,
            image: image.clone(),
            text: req.text,
            cooking_time: req.cooking_time,
            ingredients: req.ingredients.iter().collect(),
        };

        let record = match RecipeRepository::create(pool, input).await {
            Ok(record) => record,
            Err(e) => {
                media.remove(&image).await;
                return Err(ApiError::Internal(e));
            }
        };

        metrics::counter!("foodgram_recipes_created_total").increment(1);
        info!(recipe_id = record.id, author_id, "Recipe created");

        Self::present_one(pool, media, Some(author_id), record).await
    }

    /// Update a recipe owned by `user_id`
    pub async fn update(
        pool: &PgPool,
        media: &MediaStorage,
        user_id: i64,
        id: i64,
        req: UpdateRecipeRequest,
    ) -> Result<RecipeResponse, ApiError> {
        let existing = Self::find(pool, id).await?;
        ensure_author(&existing, user_id)?;

        req.validate()?;
        Self::validate_ingredients(pool, &req.ingredients).await?;
        if let Some(cooking_time) = req.cooking_time {
            validate_cooking_time(cooking_time)?;
        }

        let new_image = match req.image.as_deref() {
            Some(data) => Some(media.save(MediaKind::Recipe, data).await?),
            None => None,
        };

        let input = UpdateRecipe {
            name: req.name,
            image: new_image.clone(),
            text: req.text,
            cooking_time: req.cooking_time,
            ingredients: req.ingredients.iter().collect::<IngredientLines>(),
        };

        let updated = match RecipeRepository::update(pool, id, input).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(path) = &new_image {
                    media.remove(path).await;
                }
                return Err(ApiError::Internal(e));
            }
        };

        let Some(record) = updated else {
            // Deleted concurrently
            if let Some(path) = &new_image {
                media.remove(path).await;
            }
            return Err(ApiError::NotFound("Recipe not found".to_string()));
        };

        if new_image.is_some() && existing.image != record.image {
            media.remove(&existing.image).await;
        }

        info!(recipe_id = id, "Recipe updated");
        Self::present_one(pool, media, Some(user_id), record).await
    }

    /// Delete a recipe owned by `user_id`
    pub async fn delete(pool: &PgPool, media: &MediaStorage, user_id: i64, id: i64) -> Result<(), ApiError> {
        let existing = Self::find(pool, id).await?;
        ensure_author(&existing, user_id)?;

        Self::delete_any(pool, media, id).await
    }

    /// Delete regardless of author (staff)
    pub async fn delete_any(pool: &PgPool, media: &MediaStorage, id: i64) -> Result<(), ApiError> {
        let image = RecipeRepository::delete(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

        media.remove(&image).await;
        metrics::counter!("foodgram_recipes_deleted_total").increment(1);
        info!(recipe_id = id, "Recipe deleted");
        Ok(())
    }

    /// Add a recipe to one of the user's collections
    pub async fn add_to(
        pool: &PgPool,
        media: &MediaStorage,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<ShortRecipe, ApiError> {
        let recipe = Self::find(pool, recipe_id).await?;

        let added = CollectionRepository::add(pool, collection, user_id, recipe_id)
            .await
            .map_err(ApiError::Internal)?;
        if !added {
            return Err(ApiError::BadRequest(format!(
                "Recipe {} is already in your {}",
                recipe.name,
                collection.label()
            )));
        }

        Ok(short_recipe(media, &recipe))
    }

    pub async fn remove_from(
        pool: &PgPool,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<(), ApiError> {
        if !RecipeRepository::exists(pool, recipe_id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Recipe not found".to_string()));
        }

        let removed = CollectionRepository::remove(pool, collection, user_id, recipe_id)
            .await
            .map_err(ApiError::Internal)?;
        if !removed {
            return Err(ApiError::NotFound(format!(
                "Recipe is not in your {}",
                collection.label()
            )));
        }

        Ok(())
    }

    /// Ensure the recipe exists before handing out its short link
    pub async fn ensure_exists(pool: &PgPool, id: i64) -> Result<(), ApiError> {
        if RecipeRepository::exists(pool, id)
            .await
            .map_err(ApiError::Internal)?
        {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("Recipe {} not found", id)))
        }
    }

    async fn validate_ingredients(pool: &PgPool, ingredients: &[IngredientAmount]) -> Result<(), ApiError> {
        validate_ingredient_amounts(ingredients)?;

        let ids: Vec<i64> = ingredients.iter().map(|line| line.id).collect();
        let missing = IngredientRepository::missing_ids(pool, &ids)
            .await
            .map_err(ApiError::Internal)?;
        if let Some(id) = missing.first() {
            return Err(ApiError::field(
                "ingredients",
                format!("Ingredient {} does not exist", id),
            ));
        }

        Ok(())
    }

    async fn present_one(
        pool: &PgPool,
        media: &MediaStorage,
        viewer: Option<i64>,
        record: RecipeRecord,
    ) -> Result<RecipeResponse, ApiError> {
        Self::present(pool, media, viewer, vec![record])
            .await?
            .pop()
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))
    }

    /// Attach authors, ingredient lines and viewer flags to recipe records
    pub async fn present(
        pool: &PgPool,
        media: &MediaStorage,
        viewer: Option<i64>,
        records: Vec<RecipeRecord>,
    ) -> Result<Vec<RecipeResponse>, ApiError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let recipe_ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        let mut author_ids: Vec<i64> = records.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let author_records = UserRepository::find_by_ids(pool, &author_ids)
            .await
            .map_err(ApiError::Internal)?;
        let authors: HashMap<i64, UserResponse> = UserService::present(pool, media, viewer, &author_records)
            .await?
            .into_iter()
            .map(|author| (author.id, author))
            .collect();

        let mut lines: HashMap<i64, Vec<RecipeIngredientResponse>> = HashMap::new();
        for line in RecipeRepository::ingredients_for(pool, &recipe_ids)
            .await
            .map_err(ApiError::Internal)?
        {
            lines.entry(line.recipe_id).or_default().push(RecipeIngredientResponse {
                id: line.ingredient_id,
                name: line.name,
                measurement_unit: line.measurement_unit,
                amount: line.amount,
            });
        }

        let (favorited, in_cart) = match viewer {
            Some(viewer) => (
                Self::contained(pool, RecipeCollection::Favorites, viewer, &recipe_ids).await?,
                Self::contained(pool, RecipeCollection::ShoppingCart, viewer, &recipe_ids).await?,
            ),
            None => (HashSet::new(), HashSet::new()),
        };

        records
            .into_iter()
            .map(|record| {
                let author = authors.get(&record.author_id).cloned().ok_or_else(|| {
                    ApiError::Internal(anyhow::anyhow!(
                        "Author {} of recipe {} not found",
                        record.author_id,
                        record.id
                    ))
                })?;

                Ok(RecipeResponse {
                    id: record.id,
                    author,
                    ingredients: lines.remove(&record.id).unwrap_or_default(),
                    is_favorited: favorited.contains(&record.id),
                    is_in_shopping_cart: in_cart.contains(&record.id),
                    image: media.url(&record.image),
                    name: record.name,
                    text: record.text,
                    cooking_time: record.cooking_time,
                })
            })
            .collect()
    }

    async fn contained(
        pool: &PgPool,
        collection: RecipeCollection,
        viewer: i64,
        recipe_ids: &[i64],
    ) -> Result<HashSet<i64>, ApiError> {
        Ok(CollectionRepository::contained(pool, collection, viewer, recipe_ids)
            .await
            .map_err(ApiError::Internal)?
            .into_iter()
            .collect())
    }
}

fn ensure_author(recipe: &RecipeRecord, user_id: i64) -> Result<(), ApiError> {
    if recipe.author_id != user_id {
        warn!(recipe_id = recipe.id, user_id, "Recipe change attempted by non-author");
        return Err(ApiError::Forbidden(
            "You do not have permission to perform this action.".to_string(),
        ));
    }
    Ok(())
}
