//! Following authors

use crate::error::ApiError;
use crate::repositories::{RecipeRepository, SubscriptionRepository, UserRecord};
use crate::services::media::MediaStorage;
use crate::services::recipe::short_recipe;
use crate::services::user::{user_response, UserService};
use foodgram_shared::{AuthorWithRecipes, PageNumber, ShortRecipe};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::info;

pub struct SubscriptionService;

impl SubscriptionService {
    /// Follow an author
    pub async fn subscribe(
        pool: &PgPool,
        media: &MediaStorage,
        user_id: i64,
        author_id: i64,
        recipes_limit: Option<i64>,
    ) -> Result<AuthorWithRecipes, ApiError> {
        let author = UserService::find(pool, author_id).await?;

        if author.id == user_id {
            return Err(ApiError::BadRequest("You cannot subscribe to yourself".to_string()));
        }

        let created = SubscriptionRepository::create(pool, user_id, author_id)
            .await
            .map_err(ApiError::Internal)?;
        if !created {
            return Err(ApiError::BadRequest(format!(
                "You are already subscribed to {}",
                author.username
            )));
        }

        info!(user_id, author_id, "Subscribed");

        let mut authors = Self::with_recipes(pool, media, vec![author], recipes_limit).await?;
        authors
            .pop()
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Stop following an author
    pub async fn unsubscribe(pool: &PgPool, user_id: i64, author_id: i64) -> Result<(), ApiError> {
        UserService::find(pool, author_id).await?;

        let removed = SubscriptionRepository::delete(pool, user_id, author_id)
            .await
            .map_err(ApiError::Internal)?;
        if !removed {
            return Err(ApiError::NotFound("Subscription not found".to_string()));
        }

        info!(user_id, author_id, "Unsubscribed");
        Ok(())
    }

    /// Page of followed authors with their recipes
    pub async fn list(
        pool: &PgPool,
        media: &MediaStorage,
        user_id: i64,
        page: PageNumber,
        recipes_limit: Option<i64>,
    ) -> Result<(Vec<AuthorWithRecipes>, i64), ApiError> {
        let count = SubscriptionRepository::count_authors(pool, user_id)
            .await
            .map_err(ApiError::Internal)?;
        if page.is_out_of_range(count) {
            return Err(ApiError::NotFound("Invalid page.".to_string()));
        }

        let authors = SubscriptionRepository::authors(pool, user_id, page.limit, page.offset())
            .await
            .map_err(ApiError::Internal)?;

        Ok((Self::with_recipes(pool, media, authors, recipes_limit).await?, count))
    }

    /// Attach recipes to followed authors; the viewer follows all of them
    async fn with_recipes(
        pool: &PgPool,
        media: &MediaStorage,
        authors: Vec<UserRecord>,
        recipes_limit: Option<i64>,
    ) -> Result<Vec<AuthorWithRecipes>, ApiError> {
        let ids: Vec<i64> = authors.iter().map(|a| a.id).collect();

        let mut recipes: HashMap<i64, Vec<ShortRecipe>> = HashMap::new();
        for recipe in RecipeRepository::by_authors(pool, &ids)
            .await
            .map_err(ApiError::Internal)?
        {
            recipes
                .entry(recipe.author_id)
                .or_default()
                .push(short_recipe(media, &recipe));
        }

        let counts: HashMap<i64, i64> = RecipeRepository::count_by_authors(pool, &ids)
            .await
            .map_err(ApiError::Internal)?
            .into_iter()
            .collect();

        Ok(authors
            .iter()
            .map(|author| AuthorWithRecipes {
                user: user_response(media, author, true),
                recipes: truncate(recipes.remove(&author.id).unwrap_or_default(), recipes_limit),
                recipes_count: counts.get(&author.id).copied().unwrap_or(0),
            })
            .collect())
    }
}

/// Apply `recipes_limit`; negative limits are ignored
fn truncate(mut recipes: Vec<ShortRecipe>, limit: Option<i64>) -> Vec<ShortRecipe> {
    if let Some(limit) = limit.and_then(|l| usize::try_from(l).ok()) {
        recipes.truncate(limit);
    }
    recipes
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn recipes(n: i64) -> Vec<ShortRecipe> {
        (1..=n)
            .map(|id| ShortRecipe {
                id,
                name: format!("Recipe {}", id),
                image: String::new(),
                cooking_time: 10,
            })
            .collect()
    }

    #[rstest]
    #[case(None, 5)]
    #[case(Some(2), 2)]
    #[case(Some(0), 0)]
    #[case(Some(10), 5)]
    #[case(Some(-1), 5)]
    fn test_recipes_limit(#[case] limit: Option<i64>, #[case] expected: usize) {
        assert_eq!(truncate(recipes(5), limit).len(), expected);
    }

    #[test]
    fn test_truncate_keeps_newest_first_order() {
        let kept = truncate(recipes(3), Some(2));
        assert_eq!(kept.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
