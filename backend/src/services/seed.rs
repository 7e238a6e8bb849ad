//! Account bootstrap and demo fixtures for local environments

use crate::auth::PasswordService;
use crate::error::ApiError;
use crate::repositories::{
    CreateRecipe, CreateUser, IngredientLines, IngredientRepository, RecipeFilter,
    RecipeRepository, UserRecord, UserRepository,
};
use crate::services::media::{decode_data_url, MediaKind, MediaStorage};
use anyhow::{bail, Context, Result};
use foodgram_shared::RegisterRequest;
use sqlx::PgPool;
use tracing::{info, warn};
use validator::Validate;

/// 1x1 PNG used as the image of seeded recipes
const PLACEHOLDER_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

const DEMO_PASSWORD: &str = "foodgram-demo";

struct DemoUser {
    email: &'static str,
    username: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    recipes: &'static [(&'static str, &'static str, i32)],
}

const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        email: "anna@foodgram.local",
        username: "anna",
        first_name: "Anna",
        last_name: "Petrova",
        recipes: &[
            ("Borscht", "Simmer beetroot, cabbage and potatoes in broth.", 90),
            ("Syrniki", "Mix cottage cheese with egg and flour, fry until golden.", 25),
        ],
    },
    DemoUser {
        email: "oleg@foodgram.local",
        username: "oleg",
        first_name: "Oleg",
        last_name: "Ivanov",
        recipes: &[("Pelmeni", "Fill dough circles with minced meat and boil.", 60)],
    },
];

/// Counts of what a seeding run created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub recipes: usize,
}

pub struct SeedService;

impl SeedService {
    /// Create a staff account
    pub async fn create_superuser(pool: &PgPool, req: RegisterRequest) -> Result<UserRecord> {
        if let Err(errors) = req.validate() {
            let error = ApiError::from(errors);
            bail!("{}", error);
        }
        if UserRepository::email_exists(pool, &req.email).await? {
            bail!("a user with email {} already exists", req.email);
        }

        let password_hash = PasswordService::hash_async(req.password).await?;
        let user = UserRepository::create(
            pool,
            CreateUser {
                email: req.email,
                username: req.username,
                first_name: req.first_name,
                last_name: req.last_name,
                password_hash,
                is_staff: true,
            },
        )
        .await?;

        info!(user_id = user.id, username = %user.username, "Superuser created");
        Ok(user)
    }

    /// Create demo users and recipes; existing ones are left alone
    pub async fn seed_test_data(pool: &PgPool, media: &MediaStorage) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        let ingredients = IngredientRepository::search(pool, None).await?;
        if ingredients.is_empty() {
            warn!("No ingredients loaded; run import-ingredients first to seed recipes");
        }

        let placeholder = decode_data_url(PLACEHOLDER_PNG, usize::MAX)
            .context("placeholder image is invalid")?;

        for demo in DEMO_USERS {
            let user = match UserRepository::find_by_email(pool, demo.email).await? {
                Some(user) => user,
                None => {
                    let password_hash = PasswordService::hash_async(DEMO_PASSWORD.to_string()).await?;
                    report.users += 1;
                    UserRepository::create(
                        pool,
                        CreateUser {
                            email: demo.email.to_string(),
                            username: demo.username.to_string(),
                            first_name: demo.first_name.to_string(),
                            last_name: demo.last_name.to_string(),
                            password_hash,
                            is_staff: false,
                        },
                    )
                    .await?
                }
            };

            let filter = RecipeFilter {
                author_id: Some(user.id),
                ..RecipeFilter::default()
            };
            if ingredients.is_empty() || RecipeRepository::count(pool, filter).await? > 0 {
                continue;
            }

            for (index, (name, text, cooking_time)) in demo.recipes.iter().enumerate() {
                let ids: Vec<i64> = ingredients
                    .iter()
                    .cycle()
                    .skip(index * 3)
                    .take(ingredients.len().min(3))
                    .map(|ingredient| ingredient.id)
                    .collect();
                let amounts = [100, 2, 1].into_iter().take(ids.len()).collect();
                let lines = IngredientLines { ids, amounts };

                let image = media.write(MediaKind::Recipe, &placeholder).await?;
                RecipeRepository::create(
                    pool,
                    CreateRecipe {
                        author_id: user.id,
                        name: name.to_string(),
                        image,
                        text: text.to_string(),
                        cooking_time: *cooking_time,
                        ingredients: lines,
                    },
                )
                .await?;
                report.recipes += 1;
            }
        }

        info!(users = report.users, recipes = report.recipes, "Test data seeded");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodgram_shared::validation::validate_username;

    #[test]
    fn test_placeholder_is_a_png() {
        let image = decode_data_url(PLACEHOLDER_PNG, usize::MAX).unwrap();
        assert_eq!(image.extension, "png");
    }

    #[test]
    fn test_demo_users_are_valid() {
        for demo in DEMO_USERS {
            assert!(validate_username(demo.username).is_ok());
            assert!(demo.recipes.iter().all(|(_, _, minutes)| *minutes >= 1));
        }
    }
}
