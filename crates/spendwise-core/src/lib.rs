//! SpendWise Core Library
//!
//! Shared functionality for the SpendWise expense tracker:
//! - Database access and migrations
//! - Keyword-based category suggestion
//! - Password hashing and bearer tokens
//! - Domain models with their wire shapes

pub mod auth;
pub mod categorize;
pub mod db;
pub mod error;
pub mod models;

pub use auth::TokenSigner;
pub use categorize::suggest_category;
pub use db::Database;
pub use error::{Error, Result};
pub use models::{CategorySuggestion, Money};
