//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and media storage.

pub mod admin;
pub mod ingredient;
pub mod media;
pub mod recipe;
pub mod seed;
pub mod shopping_list;
pub mod subscription;
pub mod user;

pub use admin::AdminService;
pub use ingredient::IngredientService;
pub use media::{MediaKind, MediaStorage};
pub use recipe::RecipeService;
pub use seed::SeedService;
pub use shopping_list::{ShoppingListFormat, ShoppingListService};
pub use subscription::SubscriptionService;
pub use user::UserService;
