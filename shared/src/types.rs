//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================================================
// Users & authentication
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Enter a valid email address"), length(max = 254))]
    pub email: String,
    #[validate(
        length(min = 1, max = 150),
        custom(function = "crate::validation::validate_username")
    )]
    pub username: String,
    #[validate(length(min = 1, max = 150))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150))]
    pub last_name: String,
    #[validate(custom(function = "crate::validation::validate_password"))]
    pub password: String,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued authentication token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub auth_token: String,
}

/// Password change request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetPasswordRequest {
    #[validate(custom(function = "crate::validation::validate_password"))]
    pub new_password: String,
    pub current_password: String,
}

/// Avatar upload request (base64 data URL)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarRequest {
    pub avatar: Option<String>,
}

/// Avatar upload response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

/// Public user representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

/// User representation including their recipes, used for subscriptions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorWithRecipes {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<ShortRecipe>,
    pub recipes_count: i64,
}

/// Page-number pagination query (`?page=&limit=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub recipes_limit: Option<i64>,
}

/// Query accepted by the subscribe endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipesLimitQuery {
    pub recipes_limit: Option<i64>,
}

// ============================================================================
// Ingredients
// ============================================================================

/// Ingredient representation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// Ingredient search query (`?name=` prefix match)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientSearchQuery {
    pub name: Option<String>,
}

/// Ingredient creation, used by the admin surface and the import command
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateIngredientRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub measurement_unit: String,
}

// ============================================================================
// Recipes
// ============================================================================

/// Ingredient reference inside a recipe payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientAmount {
    pub id: i64,
    pub amount: i32,
}

/// Ingredient line of a recipe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Recipe creation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRecipeRequest {
    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
    /// Base64 data URL; an absent image is reported as a field error
    #[serde(default)]
    pub image: String,
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(length(min = 1))]
    pub text: String,
    pub cooking_time: i32,
}

/// Recipe update request; the ingredient set is always replaced
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateRecipeRequest {
    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
    pub image: Option<String>,
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

/// Full recipe representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Compact recipe representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortRecipe {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// Recipe feed query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub author: Option<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

/// Short link response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

/// Shopping list download query (`?format=txt|csv`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShoppingListQuery {
    pub format: Option<String>,
}

// ============================================================================
// Admin
// ============================================================================

/// Admin dashboard counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSummary {
    pub users: i64,
    pub recipes: i64,
    pub ingredients: i64,
    pub favorites: i64,
}

/// Admin search query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminSearchQuery {
    pub search: Option<String>,
}

/// Recipe row in the admin listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRecipeRow {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub cooking_time: i32,
    pub favorites_count: i64,
    pub pub_date: DateTime<Utc>,
}

/// User row in the admin listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub recipes_count: i64,
    pub subscribers_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link_uses_hyphenated_key() {
        let body = ShortLinkResponse {
            short_link: "http://localhost/s/1/".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["short-link"], "http://localhost/s/1/");
    }

    #[test]
    fn test_author_with_recipes_is_flat() {
        let author = AuthorWithRecipes {
            user: UserResponse {
                email: "chef@example.com".to_string(),
                id: 7,
                username: "chef".to_string(),
                first_name: "Anna".to_string(),
                last_name: "Smith".to_string(),
                is_subscribed: true,
                avatar: None,
            },
            recipes: vec![],
            recipes_count: 0,
        };
        let json = serde_json::to_value(&author).unwrap();
        assert_eq!(json["username"], "chef");
        assert_eq!(json["recipes_count"], 0);
        assert!(json.get("user").is_none());
    }

    #[test]
    fn test_register_request_validation() {
        let mut request = RegisterRequest {
            email: "chef@example.com".to_string(),
            username: "chef".to_string(),
            first_name: "Anna".to_string(),
            last_name: "Smith".to_string(),
            password: "tomato-soup".to_string(),
        };
        assert!(request.validate().is_ok());

        request.email = "not-an-email".to_string();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_update_request_name_bounds() {
        let request = UpdateRecipeRequest {
            ingredients: vec![IngredientAmount { id: 1, amount: 1 }],
            image: None,
            name: Some("x".repeat(257)),
            text: None,
            cooking_time: None,
        };
        assert!(request.validate().is_err());
    }
}
