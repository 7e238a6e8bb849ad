//! Foodgram Shared Library
//!
//! This crate contains the API request/response types, pagination helpers
//! and input validation shared by the backend and any API client.

pub mod errors;
pub mod pagination;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use pagination::{LimitOffset, PageNumber, Paginated};
pub use types::*;
