//! Foodgram backend library
//!
//! Recipe publishing, favorites, author subscriptions and shopping lists
//! behind a JSON API. The binaries and the integration tests build on
//! these modules.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
