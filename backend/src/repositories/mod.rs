//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod admin;
pub mod collection;
pub mod ingredient;
pub mod recipe;
pub mod subscription;
pub mod token;
pub mod user;

pub use admin::AdminRepository;
pub use collection::{CollectionRepository, RecipeCollection, ShoppingItem};
pub use ingredient::{IngredientRecord, IngredientRepository};
pub use recipe::{
    CreateRecipe, IngredientLines, RecipeFilter, RecipeIngredientRecord, RecipeRecord,
    RecipeRepository, UpdateRecipe,
};
pub use subscription::SubscriptionRepository;
pub use token::TokenRepository;
pub use user::{CreateUser, UserRecord, UserRepository};

/// Escape `LIKE` wildcards so user input matches literally
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("salt"), "salt");
        assert_eq!(escape_like("100%_\\"), "100\\%\\_\\\\");
    }
}
